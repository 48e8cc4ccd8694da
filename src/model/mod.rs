pub mod comment;
pub mod patch;

pub use comment::{Author, ReviewComment, ReviewThread};
pub use patch::{
    BufferRow, DiffHunk, DiffLine, DiffPosition, FilePatch, FileStatus, LineOrigin,
    MultiFilePatch, PatchBuilder, RenderStatus,
};
