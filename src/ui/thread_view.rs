//! View model for one review thread at its anchored row.
//!
//! The model is rebuilt from a placement and the thread's comments on every
//! render and holds nothing between frames.

use chrono::{DateTime, Utc};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::anchor::{BufferRange, ResolvedPlacement};
use crate::model::ReviewComment;
use crate::theme::Theme;
use crate::ui::markdown::{IssueishNavigator, IssueishRef, MarkdownRenderer, RenderedBody};
use crate::ui::styles;
use crate::ui::time_ago::format_relative_time;

const HIDDEN_PLACEHOLDER: &str = "This comment was hidden";
const BODY_INDENT: &str = "  ";

pub struct ThreadView<'a> {
    pub marker: BufferRange,
    pub comments: Vec<CommentView<'a>>,
}

pub enum CommentView<'a> {
    /// Minimized comments show a placeholder and nothing else
    Hidden { id: &'a str },
    Shown {
        header: CommentHeader<'a>,
        body: BodyView<'a>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentHeader<'a> {
    pub avatar: Option<Avatar<'a>>,
    pub byline: String,
    pub time_ago: TimeAgo<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Avatar<'a> {
    pub src: &'a str,
    pub alt: &'a str,
}

/// Relative timestamp linking to the comment's permalink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAgo<'a> {
    pub href: &'a str,
    pub time: DateTime<Utc>,
    pub label: String,
}

/// Comment body handed to the markdown renderer along with the navigator
/// it should use for cross-references.
#[derive(Clone, Copy)]
pub struct BodyView<'a> {
    pub html: &'a str,
    pub navigator: &'a dyn IssueishNavigator,
}

impl<'a> BodyView<'a> {
    pub fn render(
        &self,
        renderer: &dyn MarkdownRenderer,
        theme: &Theme,
        width: usize,
    ) -> RenderedBody<'a> {
        renderer.render(self.html, self.navigator, theme, width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: usize,
    /// Print the permalink after the timestamp
    pub show_permalinks: bool,
}

impl<'a> ThreadView<'a> {
    /// Returns None for suppressed placements, which draw nothing at all.
    pub fn build(
        placement: ResolvedPlacement,
        comments: &'a [ReviewComment],
        navigator: &'a dyn IssueishNavigator,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let marker = placement.marker_range()?;
        Some(Self {
            marker,
            comments: comments
                .iter()
                .map(|comment| CommentView::build(comment, navigator, now))
                .collect(),
        })
    }

    pub fn to_lines(
        &self,
        renderer: &dyn MarkdownRenderer,
        theme: &Theme,
        options: RenderOptions,
    ) -> Vec<Line<'static>> {
        let border = styles::thread_border_style(theme);
        let count = self.comments.len();
        let mut lines = vec![Line::from(vec![
            Span::styled("┌─ ", border),
            Span::styled(
                format!("{count} comment{}", if count == 1 { "" } else { "s" }),
                styles::thread_marker_style(theme),
            ),
        ])];

        let body_width = options.width.saturating_sub(2 + BODY_INDENT.len()).max(1);
        for (i, comment) in self.comments.iter().enumerate() {
            if i > 0 {
                lines.push(Line::from(Span::styled("│", border)));
            }
            for line in comment.to_lines(renderer, theme, options, body_width) {
                let mut spans = vec![Span::styled("│ ", border)];
                spans.extend(line.spans);
                lines.push(Line::from(spans));
            }
        }

        lines.push(Line::from(Span::styled("└─", border)));
        lines
    }

    /// Follows the first issue or pull request reference found in a visible
    /// comment body.
    pub fn follow_first_link(
        &self,
        renderer: &dyn MarkdownRenderer,
        theme: &Theme,
    ) -> Option<IssueishRef> {
        self.comments
            .iter()
            .filter_map(CommentView::body)
            .find_map(|body| {
                let rendered = body.render(renderer, theme, usize::from(u16::MAX));
                let target = rendered.links.first()?.clone();
                rendered.follow(0);
                Some(target)
            })
    }
}

impl<'a> CommentView<'a> {
    pub fn build(
        comment: &'a ReviewComment,
        navigator: &'a dyn IssueishNavigator,
        now: DateTime<Utc>,
    ) -> Self {
        if comment.is_minimized {
            return CommentView::Hidden { id: &comment.id };
        }

        let avatar = comment.author.as_ref().map(|author| Avatar {
            src: &author.avatar_url,
            alt: &author.login,
        });
        let byline = match &comment.author {
            Some(author) => format!("{} commented", author.login),
            None => "someone commented".to_string(),
        };

        CommentView::Shown {
            header: CommentHeader {
                avatar,
                byline,
                time_ago: TimeAgo {
                    href: &comment.url,
                    time: comment.created_at,
                    label: format_relative_time(comment.created_at, now),
                },
            },
            body: BodyView {
                html: &comment.body_html,
                navigator,
            },
        }
    }

    pub fn body(&self) -> Option<&BodyView<'a>> {
        match self {
            CommentView::Hidden { .. } => None,
            CommentView::Shown { body, .. } => Some(body),
        }
    }

    fn to_lines(
        &self,
        renderer: &dyn MarkdownRenderer,
        theme: &Theme,
        options: RenderOptions,
        body_width: usize,
    ) -> Vec<Line<'static>> {
        let (header, body) = match self {
            CommentView::Hidden { .. } => {
                return vec![Line::from(Span::styled(
                    format!("⊘ {HIDDEN_PLACEHOLDER}"),
                    styles::comment_hidden_style(theme),
                ))];
            }
            CommentView::Shown { header, body } => (header, body),
        };

        let avatar = if header.avatar.is_some() { "◉ " } else { "○ " };
        let mut header_spans = vec![
            Span::styled(avatar, styles::dim_style(theme)),
            Span::styled(header.byline.clone(), styles::comment_author_style(theme)),
            Span::raw(" "),
            Span::styled(
                header.time_ago.label.clone(),
                styles::comment_timestamp_style(theme),
            ),
        ];
        if options.show_permalinks && !header.time_ago.href.is_empty() {
            header_spans.push(Span::styled(
                format!(" {}", header.time_ago.href),
                styles::dim_style(theme),
            ));
        }

        let mut lines = vec![Line::from(header_spans)];
        for line in body.render(renderer, theme, body_width).lines {
            let mut spans = vec![Span::styled(BODY_INDENT, Style::default())];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
        lines
    }
}
