//! Task polling utilities
//!
//! Lets frame-driven state check on tokio tasks without blocking the UI.

use futures::FutureExt;
use tokio::task::JoinHandle;

/// Result of polling a task
pub enum PollResult<T> {
    /// No task to poll (task was None)
    NoTask,
    /// Task is still running
    Pending,
    /// Task completed with result (may be Ok or join error)
    Complete(Result<T, tokio::task::JoinError>),
}

/// Poll an optional task handle and take its result if finished.
///
/// The slot is emptied once the task completes, so a result is observed
/// exactly once.
///
/// # Example
/// ```ignore
/// match poll_task(&mut self.task) {
///     PollResult::Complete(Ok(Ok(ready))) => { /* success */ }
///     PollResult::Complete(Ok(Err(e))) => { /* task returned error */ }
///     PollResult::Complete(Err(e)) => { /* task panicked */ }
///     PollResult::Pending | PollResult::NoTask => {}
/// }
/// ```
pub fn poll_task<T>(task: &mut Option<JoinHandle<T>>) -> PollResult<T> {
    match task {
        None => return PollResult::NoTask,
        Some(handle) if !handle.is_finished() => return PollResult::Pending,
        Some(_) => {}
    }

    let Some(mut handle) = task.take() else {
        return PollResult::NoTask;
    };

    match (&mut handle).now_or_never() {
        Some(result) => PollResult::Complete(result),
        None => {
            // Shouldn't happen since we checked is_finished()
            tracing::warn!("Task not ready despite is_finished()");
            *task = Some(handle);
            PollResult::Pending
        }
    }
}
