//! # Task System Core Traits
//!
//! The building blocks of the worker pool:
//! - `Task`: a unit of work executed on a worker thread
//! - `TaskResult`: what a task hands back to the main thread
//!
//! ## Task Lifecycle
//! 1. A `Task` is scheduled via `TaskManager::publish_task()`
//! 2. Unless its cancellation token fired while it was queued, the task's
//!    `process()` runs on a worker thread
//! 3. If `process()` panics the worker catches the unwind and asks the task
//!    for a failure result through `failed()`
//! 4. The result's `handle_result()` runs on the main thread in
//!    `TaskManager::process_completed_tasks()` and may schedule follow-ups

use log::error;

use super::cancellation::CancellationToken;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks own everything they need (typically shared handles such as
/// [`crate::core::MtResource`] or `Arc`s) so they can move between threads.
pub trait Task: Send {
    /// Does the work and returns the result for the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;

    /// Short human-readable label used in log lines.
    fn describe(&self) -> String;

    /// The token that abandons this task, if it can be cancelled.
    fn cancellation(&self) -> Option<&CancellationToken> {
        None
    }

    /// Builds the result reported when `process()` panicked.
    ///
    /// # Arguments
    /// * `reason` - The panic message
    fn failed(&self, reason: String) -> Box<dyn TaskResult + Send> {
        Box::new(TaskFailure {
            task: self.describe(),
            reason,
        })
    }
}

/// The outcome of a `Task`, consumed on the main thread.
pub trait TaskResult: Send {
    /// Applies the outcome.
    ///
    /// # Returns
    /// Follow-up tasks to schedule; usually empty.
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>>;
}

/// Default result of a task that panicked.
pub struct TaskFailure {
    task: String,
    reason: String,
}

impl TaskResult for TaskFailure {
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
        error!("Task {} panicked: {}", self.task, self.reason);
        Vec::new()
    }
}
