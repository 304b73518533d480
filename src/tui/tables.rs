use crate::cascade::Level;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

pub fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        s.to_string()
    } else {
        let mut result = String::new();
        let mut width = 0;
        for c in s.chars() {
            let cw = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if width + cw + 1 > max_width {
                result.push('…');
                break;
            }
            result.push(c);
            width += cw;
        }
        result
    }
}

/// One row as shown on screen, display cells joined in server order.
fn row_text(cells: &[String], max_width: usize) -> String {
    truncate(&cells.join("  "), max_width)
}

/// Renders one selection table. The current item is highlighted with
/// reverse video; the focused table gets a bright border.
pub fn render_level(f: &mut Frame, area: Rect, title: &str, level: &Level, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    let inner_width = inner.width as usize;
    let visible_height = inner.height as usize;

    if level.items.is_empty() {
        let para = Paragraph::new("(empty)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(para, area);
        return;
    }

    // Keep the current row inside the visible window.
    let current = level.current_index().unwrap_or(0);
    let scroll_offset = if visible_height > 0 && current >= visible_height {
        current - visible_height + 1
    } else {
        0
    };

    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in level
        .items
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height.max(1))
    {
        let text = row_text(&item.cells, inner_width);
        let style = if Some(i) == level.current_index() {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::styled(text, style));
    }

    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn truncate_long_string_gets_ellipsis() {
        let t = truncate("abcdefghij", 5);
        assert!(t.ends_with('…'));
        assert!(UnicodeWidthStr::width(t.as_str()) <= 5);
    }

    #[test]
    fn truncate_handles_wide_chars() {
        let t = truncate("日本語テスト", 6);
        assert!(UnicodeWidthStr::width(t.as_str()) <= 6);
    }

    #[test]
    fn row_text_joins_cells() {
        let cells = vec!["2024-01-01".to_string(), "alice".to_string(), "pass".to_string()];
        assert_eq!(row_text(&cells, 80), "2024-01-01  alice  pass");
    }
}
