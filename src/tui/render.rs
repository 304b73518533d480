use crate::app::{ActiveOverlay, AppState, BOARD_PANES};
use crate::input::ViewId;
use crate::tui::{confirm_overlay, detail, footer, header, prompt_overlay, tables};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

pub fn render(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(3),    // tables
            Constraint::Length(5), // detail pane
            Constraint::Length(2), // footer
        ])
        .split(f.area());

    header::render(f, chunks[0], state);
    match state.view {
        ViewId::Reports => render_reports(f, chunks[1], state),
        ViewId::Boards => render_boards(f, chunks[1], state),
    }
    detail::render(f, chunks[2], state);
    footer::render(f, chunks[3], state);

    // Error banner above the footer
    if let Some(err) = state.error_message() {
        let area = f.area();
        if area.height > 6 && area.width >= 4 {
            use ratatui::style::{Color, Style};
            use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
            let err_area = Rect {
                x: area.x + 1,
                y: area.y + area.height.saturating_sub(5),
                width: area.width.saturating_sub(2),
                height: 3,
            };
            let err_widget = Paragraph::new(err.to_owned())
                .style(Style::default().fg(Color::Red))
                .block(
                    Block::default()
                        .title(" Error ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                )
                .wrap(Wrap { trim: true });
            f.render_widget(err_widget, err_area);
        }
    }

    // Overlay (drawn on top of everything)
    match &state.overlay {
        ActiveOverlay::Confirm(overlay) => confirm_overlay::render(f, overlay),
        ActiveOverlay::Prompt(overlay) => prompt_overlay::render(f, overlay),
        ActiveOverlay::None => {}
    }
}

fn render_reports(f: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(18),
            Constraint::Percentage(14),
            Constraint::Percentage(22),
            Constraint::Percentage(46), // results carry four display columns
        ])
        .split(area);

    let titles = ["apps", "versions", "tests", "results"];
    for (i, title) in titles.iter().enumerate() {
        tables::render_level(
            f,
            columns[i],
            title,
            state.reports.level(i),
            state.reports_focus == i,
        );
    }
}

fn render_boards(f: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(38), // backed-up boards show a timestamp
            Constraint::Percentage(31),
            Constraint::Percentage(31),
        ])
        .split(area);

    let titles = ["backed-up", "open", "closed"];
    for (i, (title, chain_id)) in titles.iter().zip(BOARD_PANES).enumerate() {
        tables::render_level(
            f,
            columns[i],
            title,
            state.chain(chain_id).level(0),
            state.boards_focus == i,
        );
    }
}
