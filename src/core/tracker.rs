//! # Pending tracker: count of in-flight permits.
//!
//! One atomic word holds both the number of held permits and the controller's
//! unit, which stands for "the controller is still offering permits":
//!
//! ```text
//! word = (jobs << 1) | unit
//!
//! 0b001 ─► acquire ─► 0b011 ─► release ─► 0b001 ─► release_unit ─► 0b000 ─► drained() ready
//! ```
//!
//! Readers always see both halves from the same load, so `jobs()` never counts the
//! controller's unit.
//!
//! ## Rules
//! - `acquire` is called only by the controller, serialized with offering
//! - `release` may be called from any task (permit drop)
//! - `release_unit` is called once, when draining starts
//! - zero is terminal: nothing acquires after the unit is gone

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

const UNIT: usize = 1;
const JOB: usize = 2;

/// Wait-group style counter with an async "wait until zero".
#[derive(Debug)]
pub(crate) struct PendingTracker {
    word: AtomicUsize,
    zero: Notify,
}

impl PendingTracker {
    /// Creates a tracker holding the controller's unit.
    pub(crate) fn new() -> Self {
        Self {
            word: AtomicUsize::new(UNIT),
            zero: Notify::new(),
        }
    }

    pub(crate) fn acquire(&self) {
        self.word.fetch_add(JOB, Ordering::AcqRel);
    }

    /// Releases one permit.
    pub(crate) fn release(&self) {
        self.take(JOB);
    }

    /// Releases the controller's unit.
    pub(crate) fn release_unit(&self) {
        self.take(UNIT);
    }

    /// Held permits, excluding the controller's unit.
    pub(crate) fn jobs(&self) -> usize {
        self.word.load(Ordering::Acquire) >> 1
    }

    fn take(&self, n: usize) {
        // Last one out wakes the drain waiter.
        if self.word.fetch_sub(n, Ordering::AcqRel) == n {
            self.zero.notify_waiters();
        }
    }

    /// Completes once no permit and no controller unit is held.
    pub(crate) async fn drained(&self) {
        loop {
            let notified = self.zero.notified();
            tokio::pin!(notified);
            // Register before checking, so a release landing in between still wakes us.
            notified.as_mut().enable();

            if self.word.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_jobs_exclude_controller_unit() {
        let t = PendingTracker::new();
        assert_eq!(t.jobs(), 0);
        t.acquire();
        t.acquire();
        assert_eq!(t.jobs(), 2);
        t.release_unit();
        assert_eq!(t.jobs(), 2);
        t.release();
        assert_eq!(t.jobs(), 1);
    }

    #[tokio::test]
    async fn test_drained_ready_when_zero() {
        let t = PendingTracker::new();
        t.release_unit();
        tokio::time::timeout(Duration::from_secs(1), t.drained())
            .await
            .expect("already drained");
    }

    #[tokio::test]
    async fn test_no_jobs_but_unit_held_is_not_drained() {
        let t = PendingTracker::new();
        t.acquire();
        t.release();
        assert_eq!(t.jobs(), 0);
        assert!(
            tokio::time::timeout(Duration::from_millis(20), t.drained())
                .await
                .is_err()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_drained_waits_for_concurrent_releases() {
        let t = Arc::new(PendingTracker::new());
        for _ in 0..64 {
            t.acquire();
        }

        let waiter = {
            let t = Arc::clone(&t);
            tokio::spawn(async move { t.drained().await })
        };

        t.release_unit();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        let mut handles = Vec::new();
        for _ in 0..64 {
            let t = Arc::clone(&t);
            handles.push(tokio::spawn(async move { t.release() }));
        }
        for h in handles {
            h.await.unwrap();
        }

        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("drained in time")
            .unwrap();
        assert_eq!(t.jobs(), 0);
    }
}
