use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::AppState;
use crate::input::{OverlayMode, ViewId};

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let narrow = area.width < crate::app::NARROW_WIDTH_THRESHOLD;

    let hints: &[(&str, &str)] = match state.overlay_mode() {
        OverlayMode::Confirm => &[("y", "confirm"), ("n", "cancel")],
        OverlayMode::Prompt => &[("Enter", "submit"), ("Esc", "cancel")],
        OverlayMode::None => match state.view {
            ViewId::Reports if narrow => &[
                ("jk", "select"),
                ("hl", "table"),
                ("a/x", "add/rm"),
                ("r", "refresh"),
                ("q", "quit"),
            ],
            ViewId::Reports => &[
                ("↑↓/jk", "select"),
                ("←→/hl", "table"),
                ("Tab", "boards"),
                ("a", "add result"),
                ("x", "remove result"),
                ("r", "refresh"),
                ("q", "quit"),
            ],
            ViewId::Boards if narrow => &[
                ("jk", "select"),
                ("hl", "table"),
                ("b/c/n/x/o/i", "ops"),
                ("f", "filter"),
                ("q", "quit"),
            ],
            ViewId::Boards => &[
                ("↑↓/jk", "select"),
                ("←→/hl", "table"),
                ("Tab", "reports"),
                ("b", "backup"),
                ("c", "copy"),
                ("n", "rename"),
                ("x", "close"),
                ("o", "reopen"),
                ("i", "invite org"),
                ("f", "filter"),
                ("q", "quit"),
            ],
        },
    };

    let line = if let Some(notice) = state.notice_message() {
        Line::from(vec![
            Span::styled("★ ", Style::default().fg(Color::Yellow)),
            Span::styled(notice.to_string(), Style::default().fg(Color::Yellow)),
        ])
    } else {
        let mut spans: Vec<Span> = Vec::new();
        for (i, (key, desc)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
            spans.push(Span::styled(
                format!(" {}", desc),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}
