use std::fmt;

use crate::model::{BufferRow, MultiFilePatch, ReviewThread};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressReason {
    /// The owning file is collapsed or too large to render
    PatchNotVisible,
    /// No position, or the position does not map into the rendered patch
    PositionUnresolved,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressReason::PatchNotVisible => "patch not visible",
            SuppressReason::PositionUnresolved => "position unresolved",
        }
    }
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedPlacement {
    Anchored(BufferRow),
    Suppressed(SuppressReason),
}

impl ResolvedPlacement {
    pub fn row(&self) -> Option<BufferRow> {
        match self {
            ResolvedPlacement::Anchored(row) => Some(*row),
            ResolvedPlacement::Suppressed(_) => None,
        }
    }

    /// Zero-width range at the start of the anchored row, so edits to the
    /// line's text never move the marker.
    pub fn marker_range(&self) -> Option<BufferRange> {
        self.row().map(BufferRange::at_row_start)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferPoint {
    pub row: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferRange {
    pub start: BufferPoint,
    pub end: BufferPoint,
}

impl BufferRange {
    pub fn at_row_start(row: BufferRow) -> Self {
        let point = BufferPoint {
            row: row.0,
            column: 0,
        };
        Self {
            start: point,
            end: point,
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `[[start_row, start_col], [end_row, end_col]]`
    #[cfg(test)]
    pub fn serialize(&self) -> [[u32; 2]; 2] {
        [
            [self.start.row, self.start.column],
            [self.end.row, self.end.column],
        ]
    }
}

/// Decides whether and where a thread is drawn for the current snapshot.
///
/// `is_patch_visible` is sampled first; the position index is only consulted
/// for visible patches.
pub fn resolve_placement<F>(
    thread: &ReviewThread,
    patch: &MultiFilePatch,
    is_patch_visible: F,
) -> ResolvedPlacement
where
    F: Fn() -> bool,
{
    if !is_patch_visible() {
        return ResolvedPlacement::Suppressed(SuppressReason::PatchNotVisible);
    }

    let Some(position) = thread.position() else {
        return ResolvedPlacement::Suppressed(SuppressReason::PositionUnresolved);
    };

    match patch.buffer_row_for_diff_position(thread.path(), position) {
        Ok(row) => ResolvedPlacement::Anchored(row),
        Err(err) => {
            log::debug!("suppressing thread {}: {err}", thread.root().id);
            ResolvedPlacement::Suppressed(SuppressReason::PositionUnresolved)
        }
    }
}

/// A thread together with its placement in one snapshot.
#[derive(Debug, Clone)]
pub struct PlacedThread<'a> {
    pub thread: &'a ReviewThread,
    pub placement: ResolvedPlacement,
}

/// Resolves every thread against `patch`, asking the patch itself whether the
/// owning file is visible.
pub fn place_threads<'a>(
    threads: &'a [ReviewThread],
    patch: &MultiFilePatch,
) -> Vec<PlacedThread<'a>> {
    threads
        .iter()
        .map(|thread| PlacedThread {
            thread,
            placement: resolve_placement(thread, patch, || patch.is_patch_visible(thread.path())),
        })
        .collect()
}
