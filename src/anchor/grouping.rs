use crate::model::{ReviewComment, ReviewThread};

/// Keeps the threads that can be anchored, in arrival order.
///
/// Thread membership comes from the code host. A thread is dropped when it has
/// no comments or when its root comment has no diff position.
pub fn group_threads<I>(threads: I) -> Vec<ReviewThread>
where
    I: IntoIterator<Item = Vec<ReviewComment>>,
{
    threads
        .into_iter()
        .filter_map(ReviewThread::new)
        .filter(|thread| {
            let anchored = thread.position().is_some();
            if !anchored {
                log::debug!(
                    "dropping thread {} on {}: root comment has no position",
                    thread.root().id,
                    thread.root().path
                );
            }
            anchored
        })
        .collect()
}
