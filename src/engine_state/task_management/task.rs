//! # Task System Core Types
//!
//! This module defines the fundamental building blocks of the task system,
//! which provides a framework for executing work asynchronously across multiple threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed on a worker
//! - `TaskHandle`: The submitter's end of a published task, polled for its result
//! - `TaskFailure`: Reported in place of a result when the task panicked
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and published via `TaskManager::publish_task()`
//! 2. The task's `process()` method runs on a worker thread
//! 3. The output (or the failure) is sent back over the handle's channel
//! 4. The submitter polls `TaskHandle::try_take()` without blocking
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - Its output must be `Send` to be transferred back
//! - Tasks own all of their data, so nothing is shared with the submitter while they run

use std::fmt;
use std::sync::mpsc::{Receiver, TryRecvError};

/// A trait representing a unit of work that can be executed on a worker thread.
///
/// Tasks are the primary mechanism for offloading work from the main thread to
/// background workers. They should be self-contained and own all the data they need.
pub trait Task: Send + 'static {
    /// What the task hands back to its submitter.
    type Output: Send + 'static;

    /// Performs the work. Runs on a worker thread.
    fn process(self) -> Self::Output;
}

/// A task that panicked instead of producing its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// The panic message, or why the result was lost
    pub message: String,
}

impl TaskFailure {
    /// Creates a failure carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        TaskFailure {
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task failed: {}", self.message)
    }
}

impl std::error::Error for TaskFailure {}

/// The submitter's end of a published task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T, TaskFailure>>,
}

impl<T> TaskHandle<T> {
    pub(super) fn new(receiver: Receiver<Result<T, TaskFailure>>) -> Self {
        TaskHandle { receiver }
    }

    /// Takes the result if the task has finished. Never blocks.
    ///
    /// # Returns
    /// - `None` while the task is queued or running
    /// - `Some(Ok(output))` once it completed
    /// - `Some(Err(failure))` if it panicked or its worker went away
    pub fn try_take(&self) -> Option<Result<T, TaskFailure>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(Err(TaskFailure::new("worker dropped the task")))
            }
        }
    }

    /// Blocks until the task finishes.
    pub fn wait(self) -> Result<T, TaskFailure> {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(TaskFailure::new("worker dropped the task")))
    }
}
