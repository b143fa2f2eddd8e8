//! Background task pool with waitable handles (made by FontLab https://www.fontlab.com/)

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Fixed-size pool that runs submitted work in submission order.
pub struct TaskPool {
    pool: ThreadPool,
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl TaskPool {
    pub fn new(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("fontdesc-worker-{i}"))
            .build()
            .context("building font worker pool")?;
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue `job` and return a handle to its eventual result.
    pub fn submit<T, F>(&self, job: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let handle = TaskHandle::pending();
        let slot = handle.clone();
        self.pool.spawn_fifo(move || slot.complete(job()));
        handle
    }
}

struct Slot<T> {
    value: Mutex<Option<T>>,
    ready: Condvar,
}

/// Completion handle for a submitted task.
pub struct TaskHandle<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> TaskHandle<T> {
    fn pending() -> Self {
        Self {
            slot: Arc::new(Slot {
                value: Mutex::new(None),
                ready: Condvar::new(),
            }),
        }
    }

    /// A handle that is already resolved.
    pub fn ready(value: T) -> Self {
        let handle = Self::pending();
        handle.complete(value);
        handle
    }

    fn complete(&self, value: T) {
        let mut guard = self.slot.value.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(value);
        self.slot.ready.notify_all();
    }

    pub fn is_finished(&self) -> bool {
        self.slot
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Block until the task has produced its value and take it.
    pub fn wait(self) -> T {
        let mut guard = self.slot.value.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            guard = self
                .slot
                .ready
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
