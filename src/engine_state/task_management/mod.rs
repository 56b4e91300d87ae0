//! # Task Management System
//!
//! A fixed pool of worker threads for the expensive parts of the chunk
//! pipeline: terrain generation, lighting and mesh export.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that runs on a worker
//! - `TaskResult`: The outcome of a task, applied on the main thread
//! - `TaskChannel`: Communication channel between the main thread and one worker
//! - `CancellationToken`: Lets the scheduler abandon a job it no longer needs
//!
//! Each worker owns one channel and accepts at most [`MAX_TASKS_IN_FLIGHT`]
//! tasks at a time. Anything published while every worker is busy waits in a
//! FIFO queue that is drained by `process_queued_tasks()`.
//!
//! ## Failure Isolation
//!
//! A task that panics does not take its worker down: the unwind is caught on
//! the worker, the task turns the panic message into a failure result and the
//! worker moves on to its next task.
//!
//! ## Example Usage
//! ```
//! use voxel_world::engine_state::task_management::{
//!     task::{Task, TaskResult},
//!     TaskManager,
//! };
//!
//! struct Noop;
//! struct Done;
//!
//! impl Task for Noop {
//!     fn process(&self) -> Box<dyn TaskResult + Send> {
//!         Box::new(Done)
//!     }
//!     fn describe(&self) -> String {
//!         "noop".into()
//!     }
//! }
//!
//! impl TaskResult for Done {
//!     fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
//!         Vec::new()
//!     }
//! }
//!
//! let mut task_manager = TaskManager::new(2);
//! task_manager.publish_task(Box::new(Noop));
//! assert!(task_manager.wait_idle(std::time::Duration::from_secs(5)));
//! ```

pub mod cancellation;
pub mod task;

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use web_time::{Duration, Instant};

pub use cancellation::CancellationToken;
use task::{Task, TaskResult};

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn is_cancelled(task: &dyn Task) -> bool {
    task.cancellation()
        .map(CancellationToken::is_cancelled)
        .unwrap_or(false)
}

/// Body of every worker thread: run tasks until the manager goes away.
fn worker_loop(
    tasks: Receiver<Box<dyn Task + Send>>,
    results: Sender<Box<dyn TaskResult + Send>>,
) {
    while let Ok(task) = tasks.recv() {
        let result = match panic::catch_unwind(AssertUnwindSafe(|| task.process())) {
            Ok(result) => result,
            Err(payload) => task.failed(panic_message(payload.as_ref())),
        };
        if results.send(result).is_err() {
            break;
        }
    }
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    ///
    /// A worker that fails to spawn is logged and skipped; with no workers at
    /// all every task stays queued.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {num_workers} chunk workers (available parallelism: {:?})",
            thread::available_parallelism()
        );

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let spawned = thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(move || worker_loop(task_rx, result_tx));

            match spawned {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    _worker: worker,
                }),
                Err(err) => warn!("Failed to spawn chunk worker {index}: {err}"),
            }
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of running worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks handed to workers whose results have not been processed yet.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Tasks waiting for a free worker.
    pub fn queued_len(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Returns `true` when nothing is queued or running.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent to the worker
    /// - `Err(task)` if the worker is gone, handing the task back for requeueing
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => Err(err.0),
        }
    }

    /// Finds a worker channel below [`MAX_TASKS_IN_FLIGHT`], round-robin from
    /// the last used channel.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was handed to a worker right away
    /// - `false` if it was queued because every worker is busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        match self.try_send_task(task, channel_idx) {
            Ok(_) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks onto free workers, oldest first.
    ///
    /// Tasks whose cancellation token fired while they waited are dropped
    /// here without running.
    pub fn process_queued_tasks(&mut self) {
        self.queued_tasks.retain(|task| {
            let cancelled = is_cancelled(task.as_ref());
            if cancelled {
                debug!("Dropping cancelled task {}", task.describe());
            }
            !cancelled
        });

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Applies every finished result on the calling thread.
    ///
    /// Follow-up tasks returned by the results are published afterwards.
    ///
    /// # Returns
    /// The number of results handled.
    pub fn process_completed_tasks(&mut self) -> usize {
        let mut tasks_to_queue = Vec::new();
        let mut handled = 0;

        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                tasks_to_queue.extend(result.handle_result());
                handled += 1;
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
        handled
    }

    /// Pumps results and the queue until everything has finished or `timeout` passes.
    ///
    /// # Returns
    /// `true` if the pool went idle in time.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let started = Instant::now();
        loop {
            self.process_completed_tasks();
            self.process_queued_tasks();
            if self.is_idle() {
                return true;
            }
            if self.channels.is_empty() || started.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}
