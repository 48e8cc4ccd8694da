use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use ratatui::text::Line;

use crate::anchor::{PlacedThread, ResolvedPlacement, SuppressReason, place_threads};
use crate::model::{BufferRow, MultiFilePatch, RenderStatus, ReviewThread};
use crate::theme::Theme;
use crate::ui::markdown::{HtmlBodyRenderer, IssueishNavigator, IssueishRef};
use crate::ui::thread_view::{RenderOptions, ThreadView};

/// Describes what a rendered line represents, rebuilt on every frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotatedLine {
    FileHeader {
        file_idx: usize,
    },
    /// Collapsed, too large, binary or empty file
    Notice {
        file_idx: usize,
    },
    HunkHeader {
        file_idx: usize,
        hunk_idx: usize,
    },
    DiffLine {
        file_idx: usize,
        hunk_idx: usize,
        line_idx: usize,
        row: BufferRow,
    },
    /// One line of a thread block drawn below its anchored row
    ThreadLine {
        file_idx: usize,
        thread_idx: usize,
        line_idx: usize,
    },
    Spacing,
}

impl AnnotatedLine {
    pub fn file_idx(&self) -> Option<usize> {
        match self {
            AnnotatedLine::FileHeader { file_idx }
            | AnnotatedLine::Notice { file_idx }
            | AnnotatedLine::HunkHeader { file_idx, .. }
            | AnnotatedLine::DiffLine { file_idx, .. }
            | AnnotatedLine::ThreadLine { file_idx, .. } => Some(*file_idx),
            AnnotatedLine::Spacing => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub content: String,
    pub message_type: MessageType,
}

#[derive(Debug, Default)]
pub struct DiffState {
    pub scroll_offset: usize,
    pub cursor_line: usize,
    pub viewport_height: usize,
    pub viewport_width: usize,
}

#[derive(Debug, Default)]
pub struct HelpState {
    pub scroll_offset: usize,
    pub viewport_height: usize,
    pub total_lines: usize, // Set during render
}

/// Records navigation requests from rendered comment bodies so the viewer
/// can report them.
#[derive(Debug, Default)]
pub struct NavigationLog {
    requests: RefCell<Vec<IssueishRef>>,
}

impl NavigationLog {
    pub fn take(&self) -> Vec<IssueishRef> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }
}

impl IssueishNavigator for NavigationLog {
    fn switch_to_issueish(&self, target: &IssueishRef) {
        log::info!("navigation requested to {target}");
        self.requests.borrow_mut().push(target.clone());
    }
}

pub struct App {
    pub theme: Theme,
    pub patch: MultiFilePatch,
    pub threads: Vec<ReviewThread>,
    pub renderer: HtmlBodyRenderer,
    pub navigation: NavigationLog,

    pub input_mode: InputMode,
    pub diff_state: DiffState,
    pub help_state: HelpState,

    /// Cached annotations describing what each rendered line represents
    pub line_annotations: Vec<AnnotatedLine>,
    /// Rendered thread blocks, indexed like `threads`; empty when suppressed
    pub thread_blocks: Vec<Vec<Line<'static>>>,

    pub should_quit: bool,
    pub message: Option<Message>,
}

impl App {
    pub fn new(theme: Theme, patch: MultiFilePatch, threads: Vec<ReviewThread>) -> Self {
        let mut app = Self {
            theme,
            patch,
            threads,
            renderer: HtmlBodyRenderer,
            navigation: NavigationLog::default(),
            input_mode: InputMode::Normal,
            diff_state: DiffState {
                viewport_width: 80,
                ..DiffState::default()
            },
            help_state: HelpState::default(),
            line_annotations: Vec::new(),
            thread_blocks: Vec::new(),
            should_quit: false,
            message: None,
        };
        app.rebuild_annotations(Utc::now());
        app
    }

    pub fn placements(&self) -> Vec<PlacedThread<'_>> {
        place_threads(&self.threads, &self.patch)
    }

    /// (anchored, suppressed) thread counts for the current snapshot
    pub fn placement_counts(&self) -> (usize, usize) {
        let placements = self.placements();
        let anchored = placements
            .iter()
            .filter(|p| matches!(p.placement, ResolvedPlacement::Anchored(_)))
            .count();
        (anchored, placements.len() - anchored)
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(Message {
            content: msg.into(),
            message_type: MessageType::Info,
        });
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.message = Some(Message {
            content: msg.into(),
            message_type: MessageType::Warning,
        });
    }

    /// Rebuild line annotations and thread blocks from the current snapshot.
    pub fn rebuild_annotations(&mut self, now: DateTime<Utc>) {
        let placements = place_threads(&self.threads, &self.patch);
        let options = RenderOptions {
            width: self.diff_state.viewport_width.max(20),
            show_permalinks: false,
        };

        let mut by_row: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut blocks = Vec::with_capacity(placements.len());
        for (thread_idx, placed) in placements.iter().enumerate() {
            let view = ThreadView::build(
                placed.placement,
                placed.thread.comments(),
                &self.navigation,
                now,
            );
            match view {
                Some(view) => {
                    by_row
                        .entry(view.marker.start.row)
                        .or_default()
                        .push(thread_idx);
                    blocks.push(view.to_lines(&self.renderer, &self.theme, options));
                }
                None => blocks.push(Vec::new()),
            }
        }

        let mut annotations = Vec::new();
        for (file_idx, file) in self.patch.files().iter().enumerate() {
            annotations.push(AnnotatedLine::FileHeader { file_idx });

            if !file.is_rendered() {
                annotations.push(AnnotatedLine::Notice { file_idx });
                annotations.push(AnnotatedLine::Spacing);
                continue;
            }

            let mut row = file.first_row().0;
            for (hunk_idx, hunk) in file.hunks.iter().enumerate() {
                annotations.push(AnnotatedLine::HunkHeader { file_idx, hunk_idx });
                for line_idx in 0..hunk.lines.len() {
                    annotations.push(AnnotatedLine::DiffLine {
                        file_idx,
                        hunk_idx,
                        line_idx,
                        row: BufferRow(row),
                    });
                    for &thread_idx in by_row.get(&row).into_iter().flatten() {
                        annotations.extend((0..blocks[thread_idx].len()).map(|line_idx| {
                            AnnotatedLine::ThreadLine {
                                file_idx,
                                thread_idx,
                                line_idx,
                            }
                        }));
                    }
                    row += 1;
                }
            }
            annotations.push(AnnotatedLine::Spacing);
        }

        self.line_annotations = annotations;
        self.thread_blocks = blocks;

        let max_line = self.total_lines().saturating_sub(1);
        self.diff_state.cursor_line = self.diff_state.cursor_line.min(max_line);
        self.diff_state.scroll_offset = self.diff_state.scroll_offset.min(self.max_scroll_offset());
    }

    pub fn total_lines(&self) -> usize {
        self.line_annotations.len()
    }

    pub fn max_scroll_offset(&self) -> usize {
        let viewport = self.diff_state.viewport_height.max(1);
        self.total_lines().saturating_sub(viewport)
    }

    pub fn cursor_down(&mut self, lines: usize) {
        let max_line = self.total_lines().saturating_sub(1);
        self.diff_state.cursor_line = (self.diff_state.cursor_line + lines).min(max_line);
        self.ensure_cursor_visible();
    }

    pub fn cursor_up(&mut self, lines: usize) {
        self.diff_state.cursor_line = self.diff_state.cursor_line.saturating_sub(lines);
        self.ensure_cursor_visible();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max_line = self.total_lines().saturating_sub(1);
        let max_scroll = self.max_scroll_offset();
        self.diff_state.cursor_line = (self.diff_state.cursor_line + lines).min(max_line);
        self.diff_state.scroll_offset = (self.diff_state.scroll_offset + lines).min(max_scroll);
        self.ensure_cursor_visible();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.diff_state.cursor_line = self.diff_state.cursor_line.saturating_sub(lines);
        self.diff_state.scroll_offset = self.diff_state.scroll_offset.saturating_sub(lines);
        self.ensure_cursor_visible();
    }

    pub fn go_to_top(&mut self) {
        self.diff_state.cursor_line = 0;
        self.diff_state.scroll_offset = 0;
    }

    pub fn go_to_bottom(&mut self) {
        self.diff_state.cursor_line = self.total_lines().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    fn ensure_cursor_visible(&mut self) {
        let viewport = self.diff_state.viewport_height.max(1);
        let cursor = self.diff_state.cursor_line;
        if cursor < self.diff_state.scroll_offset {
            self.diff_state.scroll_offset = cursor;
        } else if cursor >= self.diff_state.scroll_offset + viewport {
            self.diff_state.scroll_offset = cursor + 1 - viewport;
        }
    }

    fn jump_to_line(&mut self, line: usize) {
        self.diff_state.cursor_line = line;
        let viewport = self.diff_state.viewport_height.max(1);
        if line < self.diff_state.scroll_offset || line >= self.diff_state.scroll_offset + viewport
        {
            self.diff_state.scroll_offset = line.min(self.max_scroll_offset());
        }
    }

    fn find_line_after<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(&AnnotatedLine) -> bool,
    {
        let start = self.diff_state.cursor_line + 1;
        self.line_annotations
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, line)| predicate(*line))
            .map(|(idx, _)| idx)
    }

    fn find_line_before<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(&AnnotatedLine) -> bool,
    {
        let end = self.diff_state.cursor_line.min(self.total_lines());
        self.line_annotations[..end]
            .iter()
            .rposition(predicate)
    }

    pub fn next_file(&mut self) {
        if let Some(line) =
            self.find_line_after(|l| matches!(l, AnnotatedLine::FileHeader { .. }))
        {
            self.jump_to_line(line);
        }
    }

    pub fn prev_file(&mut self) {
        if let Some(line) =
            self.find_line_before(|l| matches!(l, AnnotatedLine::FileHeader { .. }))
        {
            self.jump_to_line(line);
        }
    }

    pub fn next_thread(&mut self) {
        let current = self.thread_at_cursor();
        match self.find_line_after(|l| is_thread_start(l, current)) {
            Some(line) => self.jump_to_line(line),
            None => self.set_message("No more threads below"),
        }
    }

    pub fn prev_thread(&mut self) {
        let current = self.thread_at_cursor();
        match self.find_line_before(|l| is_thread_start(l, current)) {
            Some(line) => self.jump_to_line(line),
            None => self.set_message("No more threads above"),
        }
    }

    pub fn current_file_idx(&self) -> Option<usize> {
        self.line_annotations
            .get(self.diff_state.cursor_line)
            .and_then(AnnotatedLine::file_idx)
            .or_else(|| {
                self.line_annotations[..self.diff_state.cursor_line.min(self.total_lines())]
                    .iter()
                    .rev()
                    .find_map(AnnotatedLine::file_idx)
            })
    }

    pub fn current_file_path(&self) -> Option<PathBuf> {
        let idx = self.current_file_idx()?;
        self.patch
            .files()
            .get(idx)
            .map(|f| f.display_path().to_path_buf())
    }

    /// Thread whose block contains the cursor, or the first thread anchored
    /// at the diff line under the cursor.
    pub fn thread_at_cursor(&self) -> Option<usize> {
        match self.line_annotations.get(self.diff_state.cursor_line)? {
            AnnotatedLine::ThreadLine { thread_idx, .. } => Some(*thread_idx),
            AnnotatedLine::DiffLine { .. } => {
                match self.line_annotations.get(self.diff_state.cursor_line + 1)? {
                    AnnotatedLine::ThreadLine { thread_idx, .. } => Some(*thread_idx),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Collapse or expand the file under the cursor, keeping the cursor on
    /// its header.
    pub fn toggle_collapse(&mut self) {
        let Some(file_idx) = self.current_file_idx() else {
            return;
        };
        let Some(file) = self.patch.files().get(file_idx) else {
            return;
        };
        let path = file.display_path().to_path_buf();
        let next = match file.render_status {
            RenderStatus::Visible => RenderStatus::Collapsed,
            RenderStatus::Collapsed | RenderStatus::TooLarge => RenderStatus::Visible,
        };

        log::debug!("{}: {:?} -> {:?}", path.display(), file.render_status, next);
        self.patch = self.patch.with_render_status(&path, next);
        self.rebuild_annotations(Utc::now());

        if let Some(header) = self
            .line_annotations
            .iter()
            .position(|l| *l == AnnotatedLine::FileHeader { file_idx })
        {
            self.jump_to_line(header);
        }
    }

    /// Follow the first issue or pull request link of the thread at the cursor.
    pub fn follow_link_at_cursor(&mut self) {
        let Some(thread_idx) = self.thread_at_cursor() else {
            self.set_message("No thread at cursor");
            return;
        };
        let Some(thread) = self.threads.get(thread_idx) else {
            return;
        };

        let placement = crate::anchor::resolve_placement(thread, &self.patch, || {
            self.patch.is_patch_visible(thread.path())
        });
        let followed = ThreadView::build(
            placement,
            thread.comments(),
            &self.navigation,
            Utc::now(),
        )
        .and_then(|view| view.follow_first_link(&self.renderer, &self.theme));

        match followed {
            Some(_) => {
                let targets = self.navigation.take();
                let listed = targets
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.set_message(format!("Navigate to {listed}"));
            }
            None => self.set_warning("No issue or pull request link in this thread"),
        }
    }

    pub fn suppression_summary(&self) -> Vec<(PathBuf, SuppressReason)> {
        self.placements()
            .into_iter()
            .filter_map(|p| match p.placement {
                ResolvedPlacement::Suppressed(reason) => {
                    Some((p.thread.path().to_path_buf(), reason))
                }
                ResolvedPlacement::Anchored(_) => None,
            })
            .collect()
    }

    pub fn toggle_help(&mut self) {
        self.input_mode = match self.input_mode {
            InputMode::Help => InputMode::Normal,
            InputMode::Normal => {
                self.help_state.scroll_offset = 0;
                InputMode::Help
            }
        };
    }

    pub fn help_scroll_down(&mut self, lines: usize) {
        let max_scroll = self
            .help_state
            .total_lines
            .saturating_sub(self.help_state.viewport_height);
        self.help_state.scroll_offset = (self.help_state.scroll_offset + lines).min(max_scroll);
    }

    pub fn help_scroll_up(&mut self, lines: usize) {
        self.help_state.scroll_offset = self.help_state.scroll_offset.saturating_sub(lines);
    }
}

fn is_thread_start(line: &AnnotatedLine, current: Option<usize>) -> bool {
    matches!(
        line,
        AnnotatedLine::ThreadLine { thread_idx, line_idx: 0, .. } if Some(*thread_idx) != current
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::comment::fixtures::{comment, thread};
    use crate::model::patch::fixtures::two_file_patch;

    fn app_with_threads(threads: Vec<ReviewThread>) -> App {
        let mut app = App::new(Theme::dark(), two_file_patch(), threads);
        app.diff_state.viewport_height = 10;
        app
    }

    fn thread_lines(app: &App) -> Vec<usize> {
        app.line_annotations
            .iter()
            .enumerate()
            .filter(|(_, l)| matches!(l, AnnotatedLine::ThreadLine { line_idx: 0, .. }))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn should_place_thread_block_after_anchored_row() {
        let app = app_with_threads(vec![thread(vec![comment("1", "file0.txt", Some(2))])]);

        let start = thread_lines(&app)[0];
        assert_eq!(
            app.line_annotations[start - 1],
            AnnotatedLine::DiffLine {
                file_idx: 0,
                hunk_idx: 0,
                line_idx: 1,
                row: BufferRow(1),
            }
        );
        assert_eq!(app.thread_blocks[0].len(), 4);
    }

    #[test]
    fn should_annotate_every_row_once() {
        let app = app_with_threads(Vec::new());
        let rows: Vec<u32> = app
            .line_annotations
            .iter()
            .filter_map(|l| match l {
                AnnotatedLine::DiffLine { row, .. } => Some(row.0),
                _ => None,
            })
            .collect();

        assert_eq!(rows, (0..app.patch.total_rows()).collect::<Vec<_>>());
    }

    #[test]
    fn should_count_anchored_and_suppressed_threads() {
        let app = app_with_threads(vec![
            thread(vec![comment("1", "file0.txt", Some(2))]),
            thread(vec![comment("2", "file1.txt", Some(99))]),
            thread(vec![comment("3", "missing.txt", Some(1))]),
        ]);

        assert_eq!(app.placement_counts(), (1, 2));
        assert_eq!(app.thread_blocks[1].len(), 0);
        assert_eq!(
            app.suppression_summary(),
            vec![
                (PathBuf::from("file1.txt"), SuppressReason::PositionUnresolved),
                (PathBuf::from("missing.txt"), SuppressReason::PositionUnresolved),
            ]
        );
    }

    #[test]
    fn collapse_hides_threads_and_expand_restores_them() {
        let mut app = app_with_threads(vec![thread(vec![comment("1", "file1.txt", Some(7))])]);
        app.next_file();
        app.next_file();
        assert_eq!(app.current_file_idx(), Some(1));

        app.toggle_collapse();
        assert_eq!(app.placement_counts(), (0, 1));
        assert!(thread_lines(&app).is_empty());
        assert_eq!(
            app.suppression_summary(),
            vec![(PathBuf::from("file1.txt"), SuppressReason::PatchNotVisible)]
        );

        app.toggle_collapse();
        assert_eq!(app.placement_counts(), (1, 0));
        assert_eq!(thread_lines(&app).len(), 1);
    }

    #[test]
    fn should_cycle_between_threads() {
        let mut app = app_with_threads(vec![
            thread(vec![comment("1", "file0.txt", Some(2))]),
            thread(vec![comment("2", "file1.txt", Some(7))]),
        ]);
        let starts = thread_lines(&app);

        app.next_thread();
        assert_eq!(app.diff_state.cursor_line, starts[0]);
        assert_eq!(app.thread_at_cursor(), Some(0));

        app.next_thread();
        assert_eq!(app.diff_state.cursor_line, starts[1]);
        assert_eq!(app.thread_at_cursor(), Some(1));

        app.next_thread();
        assert_eq!(app.diff_state.cursor_line, starts[1]);
        assert!(app.message.is_some());

        app.prev_thread();
        assert_eq!(app.diff_state.cursor_line, starts[0]);
    }

    #[test]
    fn should_report_followed_link() {
        let mut root = comment("1", "file0.txt", Some(2));
        root.body_html = r#"<p>see <a href="https://github.com/o/r/issues/5">#5</a></p>"#.to_string();
        let mut app = app_with_threads(vec![thread(vec![root])]);

        app.next_thread();
        app.follow_link_at_cursor();

        assert_eq!(
            app.message.as_ref().map(|m| m.content.as_str()),
            Some("Navigate to o/r#5")
        );
        assert!(app.navigation.take().is_empty());
    }

    #[test]
    fn should_warn_when_following_without_thread() {
        let mut app = app_with_threads(Vec::new());
        app.follow_link_at_cursor();
        assert_eq!(
            app.message.as_ref().map(|m| m.content.as_str()),
            Some("No thread at cursor")
        );
    }
}
