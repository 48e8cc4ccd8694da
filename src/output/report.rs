use std::fmt::Write;

use chrono::{DateTime, Utc};
use ratatui::text::Line;

use crate::anchor::{ResolvedPlacement, place_threads};
use crate::model::{MultiFilePatch, ReviewThread};
use crate::theme::Theme;
use crate::ui::markdown::{IssueishNavigator, MarkdownRenderer};
use crate::ui::thread_view::{RenderOptions, ThreadView};

/// Plain-text report of where each thread lands, for `--print`.
///
/// Anchored threads are followed by their rendered comments; suppressed
/// threads only get their placement line.
pub fn generate_report(
    patch: &MultiFilePatch,
    threads: &[ReviewThread],
    renderer: &dyn MarkdownRenderer,
    navigator: &dyn IssueishNavigator,
    now: DateTime<Utc>,
    width: usize,
) -> String {
    let mut out = String::new();
    let theme = Theme::default();
    let options = RenderOptions {
        width,
        show_permalinks: true,
    };

    for placed in place_threads(threads, patch) {
        let thread = placed.thread;
        let position = thread
            .position()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());

        match placed.placement {
            ResolvedPlacement::Anchored(row) => {
                let _ = writeln!(out, "{}:{position} -> row {}", thread.path().display(), row.0);
            }
            ResolvedPlacement::Suppressed(reason) => {
                let _ = writeln!(
                    out,
                    "{}:{position} -> suppressed ({reason})",
                    thread.path().display()
                );
            }
        }

        if let Some(view) = ThreadView::build(placed.placement, thread.comments(), navigator, now) {
            for line in view.to_lines(renderer, &theme, options) {
                let _ = writeln!(out, "{}", line_text(&line).trim_end());
            }
        }
        let _ = writeln!(out);
    }

    out
}

fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}
