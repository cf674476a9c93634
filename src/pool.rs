//! Bounded task pool for concurrency-limited fan-out.
//!
//! [`TaskPool`] runs submitted futures as independent Tokio tasks while
//! keeping at most `capacity` of them in flight:
//!
//! - A permit is acquired before each task is spawned, so [`TaskPool::submit`]
//!   suspends the submitter while the pool is full (backpressure)
//! - The permit moves into the task and is released when the task finishes (RAII)
//! - [`TaskPool::join`] is the completion barrier: it waits for every submitted
//!   task and yields their results in completion order
//!
//! Results carry no task identity. Callers that need to correlate a result with
//! its input must put that correlation into the task's output (for example an
//! index or the source reference).
//!
//! # Example
//!
//! ```
//! use workshop_core::pool::TaskPool;
//!
//! # async fn example() -> Result<(), workshop_core::PoolError> {
//! let mut pool = TaskPool::new(2)?;
//! for n in 0..5_u32 {
//!     pool.submit(async move { n * 2 }).await?;
//! }
//! let mut results = pool.join().await;
//! results.sort_unstable();
//! assert_eq!(results, vec![0, 2, 4, 6, 8]);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

/// Minimum allowed pool capacity.
const MIN_CAPACITY: usize = 1;

/// Maximum allowed pool capacity.
const MAX_CAPACITY: usize = 100;

/// Default number of simultaneously running tasks.
pub const DEFAULT_POOL_CAPACITY: usize = 4;

/// Error type for task pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Invalid capacity value provided.
    #[error("invalid pool capacity {value}: must be between {MIN_CAPACITY} and {MAX_CAPACITY}")]
    InvalidCapacity {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("pool semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Concurrency-limited runner for homogeneous async jobs.
///
/// Dropping a pool without calling [`join`](Self::join) aborts every task
/// that is still running.
#[derive(Debug)]
pub struct TaskPool<T> {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    tasks: JoinSet<T>,
    finished: Vec<T>,
    submitted: usize,
}

impl<T: Send + 'static> TaskPool<T> {
    /// Creates a pool that runs at most `capacity` tasks at once.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidCapacity`] if the value is outside
    /// the valid range (1-100).
    #[instrument(level = "debug")]
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(PoolError::InvalidCapacity { value: capacity });
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            tasks: JoinSet::new(),
            finished: Vec::new(),
            submitted: 0,
        })
    }

    /// Returns the configured concurrency ceiling.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of tasks submitted so far.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Returns the number of tasks currently holding a slot.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    /// Submits a task, waiting for a free slot first.
    ///
    /// This is the pool's only suspension point: when `capacity` tasks are
    /// already running, the caller waits until one of them finishes.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::SemaphoreClosed`] if the slot semaphore is closed.
    pub async fn submit<F>(&mut self, task: F) -> Result<(), PoolError>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PoolError::SemaphoreClosed)?;

        self.tasks.spawn(async move {
            // Permit is dropped when the task body completes
            let _permit = permit;
            task.await
        });
        self.submitted += 1;

        self.reap_finished();
        Ok(())
    }

    /// Moves already-finished task outputs into the result buffer.
    fn reap_finished(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            match joined {
                Ok(value) => self.finished.push(value),
                Err(e) => warn!(error = %e, "pool task panicked"),
            }
        }
    }

    /// Waits for every submitted task and returns results in completion order.
    ///
    /// A task that panics contributes no result; the panic is logged and the
    /// remaining tasks are still awaited. Callers compare the number of
    /// results against what they submitted to account for lost tasks.
    #[instrument(level = "debug", skip(self), fields(submitted = self.submitted))]
    pub async fn join(mut self) -> Vec<T> {
        let mut results = std::mem::take(&mut self.finished);
        results.reserve(self.tasks.len());

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(value) => results.push(value),
                Err(e) => warn!(error = %e, "pool task panicked"),
            }
        }

        debug!(
            submitted = self.submitted,
            completed = results.len(),
            "pool drained"
        );
        results
    }
}
