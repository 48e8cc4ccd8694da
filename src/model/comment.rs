use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patch::DiffPosition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// A pull request review comment as delivered by the code host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    pub id: String,
    pub path: String,
    /// None when the comment no longer maps onto the current diff
    #[serde(default)]
    pub position: Option<DiffPosition>,
    #[serde(rename = "bodyHTML", alias = "bodyHtml", default)]
    pub body_html: String,
    #[serde(default)]
    pub author: Option<Author>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_minimized: bool,
}

/// A comment and its replies, anchored by the first comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewThread {
    comments: Vec<ReviewComment>,
}

impl ReviewThread {
    /// Returns None for an empty comment list; a thread always has a root.
    pub fn new(comments: Vec<ReviewComment>) -> Option<Self> {
        if comments.is_empty() {
            None
        } else {
            Some(Self { comments })
        }
    }

    pub fn comments(&self) -> &[ReviewComment] {
        &self.comments
    }

    pub fn root(&self) -> &ReviewComment {
        &self.comments[0]
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.root().path)
    }

    pub fn position(&self) -> Option<DiffPosition> {
        self.root().position
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn comment(id: &str, path: &str, position: Option<u32>) -> ReviewComment {
        ReviewComment {
            id: id.to_string(),
            path: path.to_string(),
            position: position.map(DiffPosition),
            body_html: format!("<p>comment {id}</p>"),
            author: Some(Author {
                login: "annthurium".to_string(),
                avatar_url: "https://avatars3.githubusercontent.com/u/3781742?s=40&v=4"
                    .to_string(),
            }),
            created_at: Utc.with_ymd_and_hms(2018, 12, 27, 17, 51, 17).unwrap(),
            url: format!("https://github.com/kuychaco/test-repo/pull/4#discussion_r{id}"),
            is_minimized: false,
        }
    }

    pub(crate) fn thread(comments: Vec<ReviewComment>) -> ReviewThread {
        ReviewThread::new(comments).unwrap()
    }
}
