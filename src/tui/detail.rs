use crate::app::{AppState, AUX_ADMINS, AUX_DESCR, AUX_INVITES, AUX_LISTS, AUX_URL};
use crate::input::ViewId;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

fn labeled(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

/// The pane under the tables: descriptions of the current test and
/// result in the report view, board detail data in the board view.
pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let lines = match state.view {
        ViewId::Reports => report_lines(state),
        ViewId::Boards => board_lines(state),
    };

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(para, area);
}

fn report_lines(state: &AppState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(test) = state.reports.level(2).current_item() {
        let descr = test.aux_text(AUX_DESCR).unwrap_or("").to_string();
        lines.push(labeled("test", descr));
    }
    if let Some(result) = state.reports.level(3).current_item() {
        let descr = result.aux_text(AUX_DESCR).unwrap_or("").to_string();
        lines.push(labeled("result", descr));
    }
    lines
}

fn board_lines(state: &AppState) -> Vec<Line<'static>> {
    let Some(board) = state.open_boards.level(0).current_item() else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    if let Some(url) = board.aux_text(AUX_URL) {
        lines.push(labeled("url", url.to_string()));
    }
    if let Some(admins) = board.aux_list(AUX_ADMINS) {
        let invites = board.aux_text(AUX_INVITES).unwrap_or("");
        lines.push(labeled(
            "admins",
            format!("{} (invites: {})", admins.join(", "), invites),
        ));
    }
    if let Some(names) = board.aux_list(AUX_LISTS) {
        lines.push(labeled("lists", names.join(" | ")));
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            "loading board details…",
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines
}
