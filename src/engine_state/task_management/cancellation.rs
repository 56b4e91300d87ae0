//! Cooperative cancellation for background jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag shared between whoever schedules a job and the job itself.
///
/// Cancelling never interrupts a running job. The job polls
/// [`CancellationToken::is_cancelled`] between its stages and gives up at the
/// next check; a job still sitting in the queue is dropped without running.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`Self::cancel`] was called on this token or any clone of it.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let job_side = token.clone();
        assert!(!job_side.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(job_side.is_cancelled());
    }
}
