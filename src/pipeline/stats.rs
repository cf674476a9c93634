//! Per-stage attempt accounting.

use std::fmt;

/// Attempted/succeeded/failed counts for one pipeline stage.
///
/// `attempted` is always `succeeded + failed`; it is derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    succeeded: usize,
    failed: usize,
}

impl StageStats {
    /// Builds stats from the number of attempted items and how many succeeded.
    ///
    /// Items that produced no outcome at all (for example a task that
    /// panicked) count as failed.
    #[must_use]
    pub fn from_counts(attempted: usize, succeeded: usize) -> Self {
        let succeeded = succeeded.min(attempted);
        Self {
            succeeded,
            failed: attempted - succeeded,
        }
    }

    /// Returns the number of items attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Returns the number of items that succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Returns the number of items that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }
}

impl fmt::Display for StageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempted={} succeeded={} failed={}",
            self.attempted(),
            self.succeeded,
            self.failed
        )
    }
}
