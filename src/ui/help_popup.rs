use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::App;
use crate::ui::styles;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k, ↓/↑", "Move cursor down/up"),
            ("Ctrl-d/u", "Half page down/up"),
            ("Ctrl-f/b", "Full page down/up"),
            ("g/G", "Go to top/bottom"),
            ("{/}", "Jump to prev/next file"),
            ("N/n", "Jump to prev/next review thread"),
        ],
    ),
    (
        "Patch",
        &[
            ("Space", "Collapse or expand the file at the cursor"),
            ("o", "Open the first issue or pull request linked in the thread"),
        ],
    ),
    (
        "Other",
        &[("?", "Toggle this help"), ("q", "Quit")],
    ),
];

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, (title, keys)) in SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            *title,
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        lines.push(Line::from(""));
        for (key, description) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {key:<10}"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(*description),
            ]));
        }
    }
    lines
}

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let area = centered_rect(60, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help (j/k to scroll) - Press ? or Esc to close ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(&app.theme))
        .style(styles::panel_style(&app.theme));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = help_lines();
    app.help_state.viewport_height = inner.height as usize;
    app.help_state.total_lines = lines.len();

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(app.help_state.scroll_offset)
        .take(inner.height as usize)
        .collect();

    frame.render_widget(Paragraph::new(visible), inner);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_viewer_key() {
        let text: String = help_lines()
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        for key in ["Ctrl-d/u", "{/}", "N/n", "Space", "o ", "? ", "q "] {
            assert!(text.contains(key), "missing {key}");
        }
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 70, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 35);
        assert_eq!(popup.x, 20);
    }
}
