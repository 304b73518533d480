use crate::app::AppState;
use crate::input::ViewId;
use crate::tui::spinner;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let view_name = match state.view {
        ViewId::Reports => "reports",
        ViewId::Boards => "boards",
    };

    let mut spans = vec![
        Span::styled(
            format!(
                " madm v{}+{} ",
                env!("CARGO_PKG_VERSION"),
                env!("BUILD_NUMBER")
            ),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            state.server.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(format!("[{view_name}]"), Style::default().fg(Color::Yellow)),
    ];

    if state.view == ViewId::Boards {
        let filter = &state.board_filters[state.boards_focus];
        if !filter.is_empty() {
            spans.push(Span::styled(
                format!(" filter:{filter}"),
                Style::default().fg(Color::Magenta),
            ));
        }
    }

    if state.is_busy() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{}", spinner::frame(state.spinner_frame)),
            Style::default().fg(Color::Yellow),
        ));
    }

    if state.mutation_in_flight {
        spans.push(Span::styled(
            " [mutation pending]",
            Style::default().fg(Color::Yellow),
        ));
    }

    if state.error_message().is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(header, area);
}
