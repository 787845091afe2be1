//! Bounded background task dispatch.
//!
//! # Responsibility
//! - Run slow collaborator jobs (document generation, bulk messaging,
//!   bulk export) off the caller thread.
//! - Signal completion through an explicit per-task channel instead of
//!   blocking the caller.
//!
//! # Invariants
//! - Worker count is fixed at construction; submitting never spawns.
//! - Every submitted task reports exactly one outcome.
//! - Dropping the queue drains pending tasks, then joins the workers.

use log::{info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// Outcome reported once per submitted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub label: String,
    pub result: Result<(), String>,
}

/// Completion receipt for one submitted task.
#[derive(Debug)]
pub struct TaskHandle {
    label: String,
    receiver: Receiver<TaskOutcome>,
}

impl TaskHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Blocks until the task reports. `None` only when the queue was
    /// torn down before the task could run to completion.
    pub fn wait(self) -> Option<TaskOutcome> {
        self.receiver.recv().ok()
    }
}

type TaskJob = Box<dyn FnOnce() -> Result<(), String> + Send + 'static>;

struct QueuedTask {
    label: String,
    job: TaskJob,
    done: Sender<TaskOutcome>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<QueuedTask>,
    shutdown: bool,
}

struct QueueInner {
    state: Mutex<QueueState>,
    ready: Condvar,
}

/// Fixed-size worker pool consuming tasks in submission order.
pub struct TaskQueue {
    inner: Arc<QueueInner>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskQueue {
    /// Starts `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Self {
        let inner = Arc::new(QueueInner {
            state: Mutex::new(QueueState::default()),
            ready: Condvar::new(),
        });

        let count = worker_count.max(1);
        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let worker_inner = Arc::clone(&inner);
            let handle = std::thread::Builder::new()
                .name(format!("escolar-task-{index}"))
                .spawn(move || run_worker(worker_inner))
                .expect("spawn task queue worker thread");
            workers.push(handle);
        }

        info!("event=task_queue_start module=tasks status=ok workers={count}");
        Self { inner, workers }
    }

    /// Queues a job and returns its completion receipt.
    pub fn submit(
        &self,
        label: impl Into<String>,
        job: impl FnOnce() -> Result<(), String> + Send + 'static,
    ) -> TaskHandle {
        let label = label.into();
        let (done, receiver) = channel();

        {
            let mut state = self.inner.state.lock().expect("task queue lock poisoned");
            state.pending.push_back(QueuedTask {
                label: label.clone(),
                job: Box::new(job),
                done,
            });
        }
        self.inner.ready.notify_one();

        TaskHandle { label, receiver }
    }

    /// Number of tasks still waiting for a worker.
    pub fn pending_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .expect("task queue lock poisoned")
            .pending
            .len()
    }
}

fn run_worker(inner: Arc<QueueInner>) {
    loop {
        let task = {
            let mut state = inner.state.lock().expect("task queue lock poisoned");
            loop {
                if let Some(task) = state.pending.pop_front() {
                    break task;
                }
                if state.shutdown {
                    return;
                }
                state = inner.ready.wait(state).expect("task queue cv poisoned");
            }
        };

        let outcome = TaskOutcome {
            label: task.label,
            result: (task.job)(),
        };

        match &outcome.result {
            Ok(()) => info!(
                "event=task_done module=tasks status=ok label={}",
                outcome.label
            ),
            Err(err) => warn!(
                "event=task_done module=tasks status=error label={} error={}",
                outcome.label, err
            ),
        }

        // The caller may have dropped its handle; that is not an error.
        let _ = task.done.send(outcome);
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        {
            let mut state = self.inner.state.lock().expect("task queue lock poisoned");
            state.shutdown = true;
        }
        self.inner.ready.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
