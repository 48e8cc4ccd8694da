use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, InputMode, Message, MessageType};
use crate::theme::Theme;
use crate::ui::styles;

pub fn build_message_span(message: Option<&Message>, theme: &Theme) -> (Span<'static>, usize) {
    if let Some(msg) = message {
        let (fg, bg) = match msg.message_type {
            MessageType::Info => (theme.message_info_fg, theme.message_info_bg),
            MessageType::Warning => (theme.message_warning_fg, theme.message_warning_bg),
        };
        let content = format!(" {} ", msg.content);
        let width = content.width();
        (
            Span::styled(
                content,
                Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
            ),
            width,
        )
    } else {
        (Span::raw(""), 0)
    }
}

pub fn build_right_aligned_spans<'a>(
    mut left_spans: Vec<Span<'a>>,
    message_span: Span<'a>,
    message_width: usize,
    total_width: usize,
) -> Vec<Span<'a>> {
    let left_width: usize = left_spans.iter().map(|s| s.content.width()).sum();
    let padding_width = total_width.saturating_sub(left_width + message_width);
    let padding = Span::raw(" ".repeat(padding_width));

    left_spans.push(padding);
    if message_width > 0 {
        left_spans.push(message_span);
    }
    left_spans
}

pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let files = app.patch.files();
    let visible = files.iter().filter(|f| f.render_status.is_visible()).count();
    let title_span = Span::styled(" threadmark ", styles::header_style(theme));
    let files_span = Span::styled(
        format!("{} files ({visible} shown) ", files.len()),
        Style::default().fg(theme.fg_secondary),
    );
    let rows_span = Span::styled(
        format!("{} rows ", app.patch.total_rows()),
        styles::dim_style(theme),
    );
    let current_span = match app.current_file_path() {
        Some(path) => Span::styled(
            format!("│ {} ", path.display()),
            Style::default().fg(theme.diff_hunk_header),
        ),
        None => Span::raw(""),
    };

    let line = Line::from(vec![title_span, files_span, rows_span, current_span]);

    let header = Paragraph::new(line)
        .style(styles::status_bar_style(theme))
        .block(Block::default());

    frame.render_widget(header, area);
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let mode_str = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Help => " HELP ",
    };
    let mode_span = Span::styled(
        mode_str,
        Style::default()
            .fg(theme.message_info_fg)
            .bg(theme.message_info_bg)
            .add_modifier(Modifier::BOLD),
    );

    let (anchored, suppressed) = app.placement_counts();
    let counts_span = Span::styled(
        format!(" {anchored} anchored, {suppressed} suppressed "),
        styles::thread_marker_style(theme),
    );

    let hints = match app.input_mode {
        InputMode::Normal => " j/k:scroll  {/}:file  n/N:thread  Space:collapse  o:open  ?:help  q:quit ",
        InputMode::Help => " q/?/Esc:close ",
    };
    let hints_span = Span::styled(hints, Style::default().fg(theme.fg_secondary));

    let left_spans = vec![mode_span, counts_span, hints_span];

    // Build message span and create right-aligned layout
    let (message_span, message_width) = build_message_span(app.message.as_ref(), theme);
    let total_width = area.width as usize;
    let spans = build_right_aligned_spans(left_spans, message_span, message_width, total_width);

    let status = Paragraph::new(Line::from(spans))
        .style(styles::status_bar_style(theme))
        .block(Block::default());

    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_pad_message_to_right_edge() {
        let theme = Theme::dark();
        let message = Message {
            content: "hi".to_string(),
            message_type: MessageType::Info,
        };
        let (span, width) = build_message_span(Some(&message), &theme);
        assert_eq!(width, 4);

        let spans = build_right_aligned_spans(vec![Span::raw("abc")], span, width, 10);

        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "abc    hi ");
    }

    #[test]
    fn should_skip_empty_message() {
        let theme = Theme::dark();
        let (span, width) = build_message_span(None, &theme);
        assert_eq!(width, 0);

        let spans = build_right_aligned_spans(vec![Span::raw("abc")], span, width, 5);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn warning_uses_warning_colors() {
        let theme = Theme::dark();
        let message = Message {
            content: "careful".to_string(),
            message_type: MessageType::Warning,
        };
        let (span, _) = build_message_span(Some(&message), &theme);
        assert_eq!(span.style.bg, Some(theme.message_warning_bg));
    }
}
