//! Diff position to buffer row translation.
//!
//! Review comments count positions along one file's unified diff text: the
//! first `@@` header is position 0, every later header and every content line
//! advances the count by one. Buffer rows count rendered content lines only,
//! contiguously across every visible file of the patch.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{BufferRow, DiffPosition, FilePatch, MultiFilePatch};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("{0} is not part of the rendered patch")]
    PathNotFound(PathBuf),

    #[error("{0} has no rendered hunks")]
    NoRenderedHunks(PathBuf),

    #[error("position {position} is outside the diff of {path}")]
    PositionOutOfRange { path: PathBuf, position: DiffPosition },
}

impl MultiFilePatch {
    pub fn buffer_row_for_diff_position(
        &self,
        path: &Path,
        position: DiffPosition,
    ) -> Result<BufferRow, PositionError> {
        let file = self
            .file(path)
            .ok_or_else(|| PositionError::PathNotFound(path.to_path_buf()))?;

        if !file.is_rendered() {
            return Err(PositionError::NoRenderedHunks(path.to_path_buf()));
        }

        row_within_file(file, position).ok_or_else(|| PositionError::PositionOutOfRange {
            path: path.to_path_buf(),
            position,
        })
    }
}

fn row_within_file(file: &FilePatch, position: DiffPosition) -> Option<BufferRow> {
    // Position 0 is the first header and there is no earlier content to fall back to
    if position.0 == 0 {
        return None;
    }

    let mut row = file.first_row().0;
    for hunk in &file.hunks {
        for line in &hunk.lines {
            // A position on a header lands here on the hunk's first line
            if line.position >= position {
                return Some(BufferRow(row));
            }
            row += 1;
        }
    }
    None
}
