use chrono::Utc;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{AnnotatedLine, App, InputMode};
use crate::model::{FilePatch, LineOrigin, RenderStatus};
use crate::ui::{help_popup, status_bar, styles};

/// cursor + row + line number columns
const GUTTER_WIDTH: usize = 2 + 6 + 5 + 2;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Patch
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    status_bar::render_header(frame, app, chunks[0]);
    render_diff_view(frame, app, chunks[1]);
    status_bar::render_status_bar(frame, app, chunks[2]);

    if app.input_mode == InputMode::Help {
        help_popup::render_help(frame, app);
    }
}

fn render_diff_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" Patch ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(&app.theme));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Placements and thread blocks are derived fresh for every frame
    app.diff_state.viewport_height = inner.height as usize;
    app.diff_state.viewport_width = (inner.width as usize).saturating_sub(GUTTER_WIDTH);
    app.rebuild_annotations(Utc::now());

    let app: &App = app;
    let visible_lines: Vec<Line> = app
        .line_annotations
        .iter()
        .enumerate()
        .skip(app.diff_state.scroll_offset)
        .take(inner.height as usize)
        .map(|(idx, annotation)| {
            let is_cursor = idx == app.diff_state.cursor_line;
            let has_thread = matches!(
                app.line_annotations.get(idx + 1),
                Some(AnnotatedLine::ThreadLine { .. })
            ) && matches!(annotation, AnnotatedLine::DiffLine { .. });
            render_annotated_line(app, annotation, is_cursor, has_thread)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines), inner);
}

fn render_annotated_line(
    app: &App,
    annotation: &AnnotatedLine,
    is_cursor: bool,
    has_thread: bool,
) -> Line<'static> {
    let theme = &app.theme;
    let files = app.patch.files();
    let indicator = if is_cursor {
        Span::styled("▶ ", styles::current_line_indicator_style(theme))
    } else {
        Span::raw("  ")
    };

    let mut spans = vec![indicator];
    match annotation {
        AnnotatedLine::FileHeader { file_idx } => {
            let file = &files[*file_idx];
            let status = file.status;
            spans.push(Span::styled(
                format!("═══ {} ", file.display_path().display()),
                styles::file_header_style(theme),
            ));
            spans.push(Span::styled(
                format!("[{}] ", status.as_char()),
                styles::file_status_style(theme, status),
            ));
            spans.push(Span::styled("═".repeat(40), styles::file_header_style(theme)));
        }
        AnnotatedLine::Notice { file_idx } => {
            spans.push(Span::styled(
                format!("  {}", notice_text(&files[*file_idx])),
                styles::dim_style(theme),
            ));
        }
        AnnotatedLine::HunkHeader { file_idx, hunk_idx } => {
            let hunk = &files[*file_idx].hunks[*hunk_idx];
            spans.push(Span::raw(" ".repeat(GUTTER_WIDTH - 2)));
            spans.push(Span::styled(
                hunk.header.clone(),
                styles::diff_hunk_header_style(theme),
            ));
        }
        AnnotatedLine::DiffLine {
            file_idx,
            hunk_idx,
            line_idx,
            row,
        } => {
            let line = &files[*file_idx].hunks[*hunk_idx].lines[*line_idx];
            let style = match line.origin {
                LineOrigin::Addition => styles::diff_add_style(theme),
                LineOrigin::Deletion => styles::diff_del_style(theme),
                LineOrigin::Context => styles::diff_context_style(theme),
            };
            let line_num = match line.origin {
                LineOrigin::Deletion => line.old_lineno,
                _ => line.new_lineno.or(line.old_lineno),
            }
            .map(|n| format!("{n:>4} "))
            .unwrap_or_else(|| "     ".to_string());

            spans.push(Span::styled(format!("{:>5} ", row.0), styles::dim_style(theme)));
            spans.push(Span::styled(line_num, styles::dim_style(theme)));
            spans.push(if has_thread {
                Span::styled("● ", styles::thread_marker_style(theme))
            } else {
                Span::raw("  ")
            });
            spans.push(Span::styled(
                format!("{}{}", line.origin.prefix(), line.content),
                style,
            ));
        }
        AnnotatedLine::ThreadLine {
            thread_idx,
            line_idx,
            ..
        } => {
            spans.push(Span::raw(" ".repeat(GUTTER_WIDTH - 2)));
            if let Some(line) = app
                .thread_blocks
                .get(*thread_idx)
                .and_then(|block| block.get(*line_idx))
            {
                spans.extend(line.spans.iter().cloned());
            }
        }
        AnnotatedLine::Spacing => {}
    }

    let line = Line::from(spans);
    if is_cursor {
        line.patch_style(styles::selected_style(theme))
    } else {
        line
    }
}

fn notice_text(file: &FilePatch) -> String {
    match file.render_status {
        RenderStatus::Collapsed => "(collapsed, press Space to expand)".to_string(),
        RenderStatus::TooLarge => format!(
            "(large diff: {} lines, press Space to render)",
            file.line_count()
        ),
        RenderStatus::Visible if file.is_binary => "(binary file)".to_string(),
        RenderStatus::Visible => "(no changes)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::model::comment::fixtures::{comment, thread};
    use crate::model::patch::fixtures::two_file_patch;
    use crate::model::{PatchBuilder, ReviewThread};
    use crate::theme::Theme;

    fn screen_text(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app(threads: Vec<ReviewThread>) -> App {
        App::new(Theme::dark(), two_file_patch(), threads)
    }

    #[test]
    fn should_draw_rows_hunks_and_thread_block() {
        let mut app = app(vec![thread(vec![comment("1", "file0.txt", Some(2))])]);

        let text = screen_text(&mut app, 100, 20);

        assert!(text.contains("═══ file0.txt [M]"));
        assert!(text.contains("@@ -5 +5 @@"));
        assert!(text.contains("● +1 (2)"));
        assert!(text.contains("┌─ 1 comment"));
        assert!(text.contains("annthurium commented"));
        assert!(text.contains("comment 1"));
        assert!(text.contains("1 anchored"));
    }

    #[test]
    fn should_note_collapsed_and_too_large_files() {
        let patch = PatchBuilder::new()
            .modified("big.txt")
            .render_status(RenderStatus::TooLarge)
            .hunk_at(1)
            .unchanged(["a", "b"])
            .modified("small.txt")
            .render_status(RenderStatus::Collapsed)
            .hunk_at(1)
            .added(["c"])
            .build();
        let mut app = App::new(Theme::dark(), patch, Vec::new());

        let text = screen_text(&mut app, 100, 12);

        assert!(text.contains("(large diff: 2 lines, press Space to render)"));
        assert!(text.contains("(collapsed, press Space to expand)"));
    }

    #[test]
    fn render_updates_viewport_from_frame() {
        let mut app = app(Vec::new());
        screen_text(&mut app, 80, 12);
        // header, status bar and borders take four lines
        assert_eq!(app.diff_state.viewport_height, 8);
        assert_eq!(app.diff_state.viewport_width, 78 - GUTTER_WIDTH);
    }
}
