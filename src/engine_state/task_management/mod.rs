//! # Task Management System
//!
//! This module provides a fixed pool of worker threads that execute tasks in the
//! background while the main loop keeps running.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Owns the workers and the shared job queue
//! - `Task`: A unit of work that owns its data and produces an output
//! - `TaskHandle`: Returned by `publish_task()`, polled for the output
//!
//! All workers pull from a single FIFO queue, so tasks start in the order they were
//! published. A task that panics is caught on its worker; the panic message is
//! delivered through the handle as a `TaskFailure` and the worker keeps serving.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The next idle worker takes the oldest queued task and runs it
//! 3. The output is sent back over the task's own channel
//! 4. The submitter polls the handle once per frame with `TaskHandle::try_take()`
//!
//! ## Shutdown
//! Dropping the manager closes the queue. Workers finish the jobs still queued and
//! exit; the drop waits for all of them.
//!
//! ## Example Usage
//! ```rust
//! use voxel_world::engine_state::task_management::{Task, TaskManager};
//!
//! struct Square(u64);
//!
//! impl Task for Square {
//!     type Output = u64;
//!     fn process(self) -> u64 {
//!         self.0 * self.0
//!     }
//! }
//!
//! let manager = TaskManager::new(2);
//! let handle = manager.publish_task(Square(12));
//! assert_eq!(handle.wait(), Ok(144));
//! ```

pub mod task;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{info, warn};

pub use task::{Task, TaskFailure, TaskHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Manages a pool of worker threads and coordinates task execution.
pub struct TaskManager {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create; at least one is always started
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        let (sender, receiver) = channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        info!(
            "Available parallelism: {:?}, starting {} workers",
            thread::available_parallelism(),
            num_workers
        );

        let workers = (0..num_workers)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("chunk-worker-{id}"))
                    .spawn(move || worker_loop(receiver))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        TaskManager {
            sender: Some(sender),
            workers,
        }
    }

    /// Number of worker threads in the pool.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Publishes a new task for execution.
    ///
    /// The task is queued behind every task published before it and runs as soon as
    /// a worker is free. Never blocks.
    ///
    /// # Returns
    /// A handle to poll for the task's output.
    pub fn publish_task<T: Task>(&self, task: T) -> TaskHandle<T::Output> {
        let (result_sender, result_receiver) = channel();
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| task.process()))
                .map_err(|payload| TaskFailure::new(panic_message(payload.as_ref())));
            // The submitter may have stopped listening; the result is then discarded.
            let _ = result_sender.send(result);
        });

        if let Some(sender) = &self.sender {
            if sender.send(job).is_err() {
                warn!("Task queue closed, dropping task");
            }
        }
        TaskHandle::new(result_receiver)
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("Worker thread exited abnormally");
            }
        }
    }
}

fn worker_loop(receiver: Arc<Mutex<Receiver<Job>>>) {
    loop {
        let job = match receiver.lock() {
            Ok(queue) => queue.recv(),
            Err(_) => return,
        };
        match job {
            Ok(job) => job(),
            Err(_) => return,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct Square(u64);

    impl Task for Square {
        type Output = u64;

        fn process(self) -> u64 {
            self.0 * self.0
        }
    }

    struct Explode;

    impl Task for Explode {
        type Output = ();

        fn process(self) {
            panic!("boom");
        }
    }

    #[test]
    fn tasks_deliver_their_output() {
        let manager = TaskManager::new(3);
        let handles: Vec<_> = (0..32).map(|n| manager.publish_task(Square(n))).collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.wait()).collect();
        assert_eq!(results, (0..32).map(|n| Ok(n * n)).collect::<Vec<_>>());
    }

    #[test]
    fn try_take_is_non_blocking_and_eventually_ready() {
        let manager = TaskManager::new(1);
        let handle = manager.publish_task(Square(7));
        let deadline = Instant::now() + Duration::from_secs(5);
        let result = loop {
            if let Some(result) = handle.try_take() {
                break result;
            }
            assert!(Instant::now() < deadline, "task never finished");
            thread::sleep(Duration::from_millis(1));
        };
        assert_eq!(result, Ok(49));
    }

    #[test]
    fn panics_are_reported_and_workers_survive() {
        let manager = TaskManager::new(1);
        let failure = manager.publish_task(Explode).wait();
        assert_eq!(failure, Err(TaskFailure::new("boom")));
        assert_eq!(manager.publish_task(Square(3)).wait(), Ok(9));
    }

    #[test]
    fn zero_workers_still_starts_one() {
        let manager = TaskManager::new(0);
        assert_eq!(manager.num_workers(), 1);
    }
}
