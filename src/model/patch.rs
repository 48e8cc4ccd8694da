use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 1-based offset into one file's unified diff text, the way review comment
/// `position` fields count it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffPosition(pub u32);

impl fmt::Display for DiffPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based row in the rendered multi-file patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferRow(pub u32);

impl fmt::Display for BufferRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl FileStatus {
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
            FileStatus::Copied => 'C',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    Context,
    Addition,
    Deletion,
}

impl LineOrigin {
    pub fn prefix(&self) -> char {
        match self {
            LineOrigin::Context => ' ',
            LineOrigin::Addition => '+',
            LineOrigin::Deletion => '-',
        }
    }
}

/// Whether a file's hunks occupy rows in the rendered patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStatus {
    #[default]
    Visible,
    /// Folded away by the user
    Collapsed,
    /// Above the large diff threshold; rendered only on request
    TooLarge,
}

impl RenderStatus {
    pub fn is_visible(&self) -> bool {
        matches!(self, RenderStatus::Visible)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub origin: LineOrigin,
    pub content: String,
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
    pub position: DiffPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub header: String,
    pub lines: Vec<DiffLine>,
    /// Starting line number in the old file (from @@ header)
    pub old_start: u32,
    pub old_count: u32,
    /// Starting line number in the new file (from @@ header)
    pub new_start: u32,
    pub new_count: u32,
    /// Diff position of the header line itself. Zero for a file's first hunk.
    pub header_position: DiffPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
    pub status: FileStatus,
    pub hunks: Vec<DiffHunk>,
    pub is_binary: bool,
    pub render_status: RenderStatus,
    /// Rows this file occupies in the snapshot; empty when not rendered
    pub(crate) rows: Range<u32>,
}

impl FilePatch {
    pub fn display_path(&self) -> &Path {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or_else(|| Path::new(""))
    }

    /// Review comments address the old path; added files only have a new one.
    pub fn lookup_path(&self) -> Option<&Path> {
        self.old_path.as_deref().or(self.new_path.as_deref())
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        self.old_path.as_deref() == Some(path) || self.new_path.as_deref() == Some(path)
    }

    pub fn line_count(&self) -> usize {
        self.hunks.iter().map(|h| h.lines.len()).sum()
    }

    pub fn is_rendered(&self) -> bool {
        self.render_status.is_visible() && !self.hunks.is_empty()
    }

    pub fn first_row(&self) -> BufferRow {
        BufferRow(self.rows.start)
    }

    #[cfg(test)]
    pub fn row_span(&self) -> Range<u32> {
        self.rows.clone()
    }
}

/// Immutable snapshot of a parsed diff as currently displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiFilePatch {
    files: Vec<FilePatch>,
    total_rows: u32,
}

impl MultiFilePatch {
    pub fn new(mut files: Vec<FilePatch>) -> Self {
        let total_rows = assign_rows(&mut files);
        Self { files, total_rows }
    }

    pub fn files(&self) -> &[FilePatch] {
        &self.files
    }

    pub fn total_rows(&self) -> u32 {
        self.total_rows
    }

    pub fn file(&self, path: &Path) -> Option<&FilePatch> {
        self.files
            .iter()
            .find(|f| f.lookup_path() == Some(path))
            .or_else(|| self.files.iter().find(|f| f.matches_path(path)))
    }

    /// False only for a file of this patch that is collapsed or too large.
    /// Unknown paths are left for the position index to reject.
    pub fn is_patch_visible(&self, path: &Path) -> bool {
        self.file(path).is_none_or(|f| f.render_status.is_visible())
    }

    pub fn collapse(&self, path: &Path) -> Self {
        self.with_render_status(path, RenderStatus::Collapsed)
    }

    pub fn expand(&self, path: &Path) -> Self {
        self.with_render_status(path, RenderStatus::Visible)
    }

    pub fn with_render_status(&self, path: &Path, status: RenderStatus) -> Self {
        let files = self
            .files
            .iter()
            .cloned()
            .map(|mut f| {
                if f.matches_path(path) {
                    f.render_status = status;
                }
                f
            })
            .collect();
        Self::new(files)
    }
}

fn assign_rows(files: &mut [FilePatch]) -> u32 {
    let mut next = 0u32;
    for file in files.iter_mut() {
        let start = next;
        if file.render_status.is_visible() {
            next += file.line_count() as u32;
        }
        file.rows = start..next;
    }
    next
}

/// Incremental construction of a [`MultiFilePatch`], assigning diff positions
/// as lines are pushed.
#[derive(Debug, Default)]
pub struct PatchBuilder {
    files: Vec<FilePatch>,
    next_position: u32,
    old_lineno: u32,
    new_lineno: u32,
}

impl PatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(
        &mut self,
        old_path: Option<PathBuf>,
        new_path: Option<PathBuf>,
        status: FileStatus,
    ) -> &mut Self {
        self.files.push(FilePatch {
            old_path,
            new_path,
            status,
            hunks: Vec::new(),
            is_binary: false,
            render_status: RenderStatus::Visible,
            rows: 0..0,
        });
        self.next_position = 0;
        self
    }

    pub fn binary(&mut self) -> &mut Self {
        if let Some(file) = self.files.last_mut() {
            file.is_binary = true;
        }
        self
    }

    pub fn render_status(&mut self, status: RenderStatus) -> &mut Self {
        if let Some(file) = self.files.last_mut() {
            file.render_status = status;
        }
        self
    }

    /// Opens a hunk. Counts are filled in from the pushed lines when the
    /// caller passes `None`.
    pub fn hunk(
        &mut self,
        header: impl Into<String>,
        old_start: u32,
        old_count: Option<u32>,
        new_start: u32,
        new_count: Option<u32>,
    ) -> &mut Self {
        let Some(file) = self.files.last_mut() else {
            return self;
        };
        let header_position = if file.hunks.is_empty() {
            DiffPosition(0)
        } else {
            self.next_position += 1;
            DiffPosition(self.next_position)
        };
        file.hunks.push(DiffHunk {
            header: header.into(),
            lines: Vec::new(),
            old_start,
            old_count: old_count.unwrap_or(u32::MAX),
            new_start,
            new_count: new_count.unwrap_or(u32::MAX),
            header_position,
        });
        self.old_lineno = old_start;
        self.new_lineno = new_start;
        self
    }

    pub fn line(&mut self, origin: LineOrigin, content: impl Into<String>) -> &mut Self {
        let Some(hunk) = self.files.last_mut().and_then(|f| f.hunks.last_mut()) else {
            return self;
        };
        let (old_lineno, new_lineno) = match origin {
            LineOrigin::Context => {
                let nums = (Some(self.old_lineno), Some(self.new_lineno));
                self.old_lineno += 1;
                self.new_lineno += 1;
                nums
            }
            LineOrigin::Addition => {
                let num = self.new_lineno;
                self.new_lineno += 1;
                (None, Some(num))
            }
            LineOrigin::Deletion => {
                let num = self.old_lineno;
                self.old_lineno += 1;
                (Some(num), None)
            }
        };
        self.next_position += 1;
        hunk.lines.push(DiffLine {
            origin,
            content: content.into(),
            old_lineno,
            new_lineno,
            position: DiffPosition(self.next_position),
        });
        self
    }

    pub fn build(&mut self) -> MultiFilePatch {
        let mut files = std::mem::take(&mut self.files);
        for hunk in files.iter_mut().flat_map(|f| f.hunks.iter_mut()) {
            let old = hunk.lines.iter().filter(|l| l.origin != LineOrigin::Addition).count();
            let new = hunk.lines.iter().filter(|l| l.origin != LineOrigin::Deletion).count();
            if hunk.old_count == u32::MAX {
                hunk.old_count = old as u32;
            }
            if hunk.new_count == u32::MAX {
                hunk.new_count = new as u32;
            }
        }
        MultiFilePatch::new(files)
    }
}

#[cfg(test)]
impl PatchBuilder {
    /// Shorthand for a modified file whose old and new paths agree.
    pub fn modified(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        self.file(Some(path.clone()), Some(path), FileStatus::Modified)
    }

    /// Opens a hunk starting at `old_row` with a synthesized header.
    pub fn hunk_at(&mut self, old_row: u32) -> &mut Self {
        self.hunk(format!("@@ -{old_row} +{old_row} @@"), old_row, None, old_row, None)
    }

    pub fn unchanged<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.line(LineOrigin::Context, line);
        }
        self
    }

    pub fn added<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.line(LineOrigin::Addition, line);
        }
        self
    }

    pub fn deleted<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.line(LineOrigin::Deletion, line);
        }
        self
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Two files, five hunks. Line text is "<row> (<position>)".
    pub(crate) fn two_file_patch() -> MultiFilePatch {
        PatchBuilder::new()
            .modified("file0.txt")
            .hunk_at(5)
            .unchanged(["0 (1)"])
            .added(["1 (2)", "2 (3)", "3 (4)"])
            .unchanged(["4 (5)"])
            .hunk_at(20)
            .unchanged(["5 (7)"])
            .deleted(["6 (8)", "7 (9)", "8 (10)"])
            .unchanged(["9 (11)"])
            .hunk_at(30)
            .unchanged(["10 (13)"])
            .added(["11 (14)", "12 (15)"])
            .deleted(["13 (16)"])
            .unchanged(["14 (17)"])
            .modified("file1.txt")
            .hunk_at(5)
            .unchanged(["15 (1)"])
            .added(["16 (2)"])
            .unchanged(["17 (3)"])
            .hunk_at(20)
            .unchanged(["18 (5)"])
            .deleted(["19 (6)", "20 (7)", "21 (8)"])
            .unchanged(["22 (9)"])
            .build()
    }
}
