use ratatui::style::{Modifier, Style};

use crate::model::FileStatus;
use crate::theme::Theme;

pub fn header_style(theme: &Theme) -> Style {
    Style::default()
        .bg(theme.panel_bg)
        .fg(theme.fg_primary)
        .add_modifier(Modifier::BOLD)
}

pub fn selected_style(theme: &Theme) -> Style {
    Style::default().bg(theme.bg_highlight).fg(theme.fg_primary)
}

pub fn dim_style(theme: &Theme) -> Style {
    Style::default().fg(theme.fg_dim)
}

pub fn diff_add_style(theme: &Theme) -> Style {
    Style::default().fg(theme.diff_add).bg(theme.diff_add_bg)
}

pub fn diff_del_style(theme: &Theme) -> Style {
    Style::default().fg(theme.diff_del).bg(theme.diff_del_bg)
}

pub fn diff_context_style(theme: &Theme) -> Style {
    Style::default().fg(theme.diff_context)
}

pub fn diff_hunk_header_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.diff_hunk_header)
        .add_modifier(Modifier::BOLD)
}

pub fn file_header_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.fg_primary)
        .add_modifier(Modifier::BOLD)
}

pub fn border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.border_focused)
}

pub fn panel_style(theme: &Theme) -> Style {
    Style::default().bg(theme.panel_bg).fg(theme.fg_primary)
}

pub fn status_bar_style(theme: &Theme) -> Style {
    Style::default()
        .bg(theme.status_bar_bg)
        .fg(theme.fg_primary)
}

pub fn file_status_style(theme: &Theme, status: FileStatus) -> Style {
    let color = match status {
        FileStatus::Added => theme.file_added,
        FileStatus::Modified => theme.file_modified,
        FileStatus::Deleted => theme.file_deleted,
        FileStatus::Renamed | FileStatus::Copied => theme.file_renamed,
    };
    Style::default().fg(color)
}

pub fn current_line_indicator_style(theme: &Theme) -> Style {
    Style::default().fg(theme.cursor_color)
}

pub fn thread_marker_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.thread_marker)
        .add_modifier(Modifier::BOLD)
}

pub fn thread_border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.thread_marker)
}

pub fn comment_author_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.comment_author)
        .add_modifier(Modifier::BOLD)
}

pub fn comment_timestamp_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.comment_timestamp)
        .add_modifier(Modifier::UNDERLINED)
}

pub fn comment_hidden_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.comment_hidden)
        .add_modifier(Modifier::ITALIC)
}
