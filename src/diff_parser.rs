//! Unified diff parser.
//!
//! Parses `git diff`-style output (or a bare `---`/`+++` patch) into a
//! [`MultiFilePatch`], assigning review-comment diff positions on the way.

use std::path::PathBuf;

use crate::error::{Result, ThreadmarkError};
use crate::model::{FileStatus, LineOrigin, MultiFilePatch, PatchBuilder, RenderStatus};

/// Parse unified diff text. Files with more content lines than
/// `large_diff_threshold` start out as [`RenderStatus::TooLarge`].
pub fn parse_unified_diff(diff_text: &str, large_diff_threshold: usize) -> Result<MultiFilePatch> {
    let mut builder = PatchBuilder::new();
    let mut file_count = 0usize;
    let mut lines = diff_text.lines().peekable();

    while let Some(line) = lines.peek().copied() {
        if !(line.starts_with("diff ") || line.starts_with("--- ")) {
            lines.next(); // skip preamble (commit messages, index lines, etc.)
            continue;
        }
        if line.starts_with("diff ") {
            lines.next();
        }

        let (old_path, new_path, status, is_binary) = parse_file_header(&mut lines);
        if old_path.is_none() && new_path.is_none() {
            return Err(ThreadmarkError::InvalidPatch(format!(
                "file header without paths near '{line}'"
            )));
        }

        builder.file(old_path, new_path, status);
        file_count += 1;
        if is_binary {
            builder.binary();
            continue;
        }

        let mut line_count = 0usize;
        while let Some(peek_line) = lines.peek() {
            if peek_line.starts_with("diff ") || peek_line.starts_with("--- ") {
                break;
            } else if peek_line.starts_with("@@") {
                line_count += parse_hunk(&mut lines, &mut builder)?;
            } else {
                lines.next(); // skip non-hunk, non-diff lines
            }
        }

        if line_count > large_diff_threshold {
            log::debug!("deferring file with {line_count} lines (threshold {large_diff_threshold})");
            builder.render_status(RenderStatus::TooLarge);
        }
    }

    if file_count == 0 {
        return Err(ThreadmarkError::NoChanges);
    }

    Ok(builder.build())
}

fn parse_file_header<'a, I>(
    lines: &mut std::iter::Peekable<I>,
) -> (Option<PathBuf>, Option<PathBuf>, FileStatus, bool)
where
    I: Iterator<Item = &'a str>,
{
    let mut old_path: Option<PathBuf> = None;
    let mut new_path: Option<PathBuf> = None;
    let mut status = FileStatus::Modified;
    let mut is_binary = false;

    while let Some(line) = lines.peek() {
        if let Some(rest) = line.strip_prefix("--- ") {
            old_path = parse_header_path(rest, "a/");
            lines.next();
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            new_path = parse_header_path(rest, "b/");
            lines.next();
            break; // Done with file header
        } else if line.starts_with("new file") {
            status = FileStatus::Added;
            lines.next();
        } else if line.starts_with("deleted file") {
            status = FileStatus::Deleted;
            lines.next();
        } else if let Some(path) = line.strip_prefix("rename from ") {
            status = FileStatus::Renamed;
            old_path = Some(PathBuf::from(path));
            lines.next();
        } else if let Some(path) = line.strip_prefix("rename to ") {
            new_path = Some(PathBuf::from(path));
            lines.next();
        } else if let Some(path) = line.strip_prefix("copy from ") {
            status = FileStatus::Copied;
            old_path = Some(PathBuf::from(path));
            lines.next();
        } else if let Some(path) = line.strip_prefix("copy to ") {
            new_path = Some(PathBuf::from(path));
            lines.next();
        } else if line.starts_with("Binary files") {
            if let Some((old, new)) = parse_binary_file_line(line) {
                old_path = old_path.or(old);
                new_path = new_path.or(new);
                if old_path.is_none() {
                    status = FileStatus::Added;
                } else if new_path.is_none() {
                    status = FileStatus::Deleted;
                }
            }
            is_binary = true;
            lines.next();
            break;
        } else if line.starts_with("@@") || line.starts_with("diff ") {
            break;
        } else {
            lines.next(); // index, mode and similarity lines
        }
    }

    // Determine status from paths if not already set by metadata
    if status == FileStatus::Modified {
        if old_path.is_none() && new_path.is_some() {
            status = FileStatus::Added;
        } else if old_path.is_some() && new_path.is_none() {
            status = FileStatus::Deleted;
        }
    }

    (old_path, new_path, status, is_binary)
}

fn parse_header_path(rest: &str, prefix: &str) -> Option<PathBuf> {
    // Strip a trailing timestamp separated by a tab
    let path = rest.split('\t').next().unwrap_or(rest);
    if path == "/dev/null" {
        return None;
    }
    Some(PathBuf::from(path.strip_prefix(prefix).unwrap_or(path)))
}

/// Consumes one hunk and returns how many content lines it held.
fn parse_hunk<'a, I>(lines: &mut std::iter::Peekable<I>, builder: &mut PatchBuilder) -> Result<usize>
where
    I: Iterator<Item = &'a str>,
{
    let Some(header_line) = lines.next() else {
        return Ok(0);
    };

    let (old_start, old_count, new_start, new_count) = parse_hunk_header(header_line)
        .ok_or_else(|| ThreadmarkError::InvalidPatch(format!("bad hunk header '{header_line}'")))?;

    builder.hunk(
        header_line,
        old_start,
        Some(old_count),
        new_start,
        Some(new_count),
    );

    let mut count = 0usize;
    let (mut old_seen, mut new_seen) = (0u32, 0u32);
    while let Some(line) = lines.peek().copied() {
        if line.starts_with("@@") || line.starts_with("diff ") {
            break;
        }
        // Once the header's counts are met only a "\ No newline" marker still
        // belongs to the hunk; format-patch signatures and trailers do not
        if old_seen >= old_count && new_seen >= new_count {
            if line.starts_with('\\') {
                lines.next();
                continue;
            }
            break;
        }
        lines.next();

        let (origin, content) = if let Some(stripped) = line.strip_prefix('+') {
            (LineOrigin::Addition, stripped)
        } else if let Some(stripped) = line.strip_prefix('-') {
            (LineOrigin::Deletion, stripped)
        } else if let Some(stripped) = line.strip_prefix(' ') {
            (LineOrigin::Context, stripped)
        } else if line.is_empty() {
            (LineOrigin::Context, "")
        } else {
            // "\ No newline at end of file" and anything unknown
            continue;
        };

        if origin != LineOrigin::Addition {
            old_seen += 1;
        }
        if origin != LineOrigin::Deletion {
            new_seen += 1;
        }
        builder.line(origin, content);
        count += 1;
    }

    Ok(count)
}

fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    // Format: @@ -old_start,old_count +new_start,new_count @@
    // or: @@ -old_start +new_start @@ (count defaults to 1)

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 || parts[0] != "@@" {
        return None;
    }

    let old_part = parts[1].strip_prefix('-')?;
    let new_part = parts[2].strip_prefix('+')?;

    let (old_start, old_count) = parse_range(old_part)?;
    let (new_start, new_count) = parse_range(new_part)?;

    Some((old_start, old_count, new_start, new_count))
}

fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

/// "Binary files a/<old> and b/<new> differ"
fn parse_binary_file_line(line: &str) -> Option<(Option<PathBuf>, Option<PathBuf>)> {
    let content = line.strip_prefix("Binary files ")?.strip_suffix(" differ")?;
    let (old_part, new_part) = content.split_once(" and ")?;
    Some((parse_header_path(old_part, "a/"), parse_header_path(new_part, "b/")))
}
