use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, ThreadmarkError};
use crate::model::ReviewComment;

#[derive(Debug, Deserialize)]
struct ThreadRecord {
    comments: CommentList,
}

/// Either a plain array or a GraphQL connection (`{"edges": [{"node": ..}]}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommentList {
    Plain(Vec<ReviewComment>),
    Connection { edges: Vec<Edge<ReviewComment>> },
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestDocument {
    review_threads: ThreadConnection,
}

#[derive(Debug, Deserialize)]
struct ThreadConnection {
    edges: Vec<Edge<ThreadRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ThreadsDocument {
    Plain(Vec<ThreadRecord>),
    PullRequest(PullRequestDocument),
    Data { data: PullRequestDocument },
}

impl CommentList {
    fn into_vec(self) -> Vec<ReviewComment> {
        match self {
            CommentList::Plain(comments) => comments,
            CommentList::Connection { edges } => edges.into_iter().map(|e| e.node).collect(),
        }
    }
}

/// Parse review threads, one comment list per thread, in document order.
pub fn parse_threads(json: &str) -> Result<Vec<Vec<ReviewComment>>> {
    let document: ThreadsDocument =
        serde_json::from_str(json).map_err(|e| ThreadmarkError::InvalidThreads(e.to_string()))?;

    let records = match document {
        ThreadsDocument::Plain(records) => records,
        ThreadsDocument::PullRequest(pr) | ThreadsDocument::Data { data: pr } => {
            pr.review_threads.edges.into_iter().map(|e| e.node).collect()
        }
    };

    Ok(records.into_iter().map(|r| r.comments.into_vec()).collect())
}

pub fn load_threads(path: &Path) -> Result<Vec<Vec<ReviewComment>>> {
    let contents = fs::read_to_string(path)?;
    let threads = parse_threads(&contents)?;
    log::debug!("loaded {} review threads from {}", threads.len(), path.display());
    Ok(threads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiffPosition;
    use tempfile::tempdir;

    const COMMENT: &str = r#"{
        "id": "0",
        "path": "file0.txt",
        "position": 2,
        "bodyHTML": "one",
        "author": null,
        "createdAt": "2018-12-27T17:51:17Z"
    }"#;

    #[test]
    fn should_parse_plain_thread_array() {
        // given
        let json = format!(r#"[{{"comments": [{COMMENT}]}}, {{"comments": []}}]"#);

        // when
        let threads = parse_threads(&json).unwrap();

        // then
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0][0].position, Some(DiffPosition(2)));
        assert!(threads[1].is_empty());
    }

    #[test]
    fn should_parse_graphql_connection_shape() {
        let json = format!(
            r#"{{"data": {{"reviewThreads": {{"edges": [
                {{"node": {{"comments": {{"edges": [{{"node": {COMMENT}}}]}}}}}}
            ]}}}}}}"#
        );

        let threads = parse_threads(&json).unwrap();

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0][0].path, "file0.txt");
    }

    #[test]
    fn should_parse_pull_request_without_data_wrapper() {
        let json = format!(
            r#"{{"reviewThreads": {{"edges": [{{"node": {{"comments": [{COMMENT}]}}}}]}}}}"#
        );

        let threads = parse_threads(&json).unwrap();

        assert_eq!(threads[0].len(), 1);
    }

    #[test]
    fn should_report_malformed_json_as_invalid_threads() {
        assert!(matches!(
            parse_threads("{not json"),
            Err(ThreadmarkError::InvalidThreads(_))
        ));
        assert!(matches!(
            parse_threads(r#"{"unexpected": true}"#),
            Err(ThreadmarkError::InvalidThreads(_))
        ));
    }

    #[test]
    fn should_load_threads_from_file() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("threads.json");
        fs::write(&path, format!(r#"[{{"comments": [{COMMENT}]}}]"#))
            .expect("failed to write threads");

        let threads = load_threads(&path).expect("threads should load");

        assert_eq!(threads.len(), 1);
    }

    #[test]
    fn should_surface_missing_file_as_io_error() {
        let dir = tempdir().expect("failed to create temp dir");
        let result = load_threads(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ThreadmarkError::Io(_))));
    }
}
