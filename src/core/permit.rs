//! # Permit: proof that one job is in flight.
//!
//! A [`Permit`] is issued by the controller loop and handed to exactly one caller.
//! Dropping it releases its unit in the pending tracker, so release happens on every
//! exit path: normal return, `?`, panic unwind, or the caller's future being dropped.
//!
//! Every permit of a gate carries a clone of the **same** shutdown token the
//! controller observes; clones share state, no per-job token is created.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::tracker::PendingTracker;

/// One-shot admission capability.
#[must_use = "dropping a permit releases it immediately"]
pub struct Permit {
    tracker: Arc<PendingTracker>,
    token: CancellationToken,
}

impl Permit {
    /// Counts the permit in `tracker` and binds it to the shared shutdown `token`.
    pub(crate) fn issue(tracker: Arc<PendingTracker>, token: CancellationToken) -> Self {
        tracker.acquire();
        Self { tracker, token }
    }

    /// Shutdown token shared by all permits of the gate.
    ///
    /// Cancellation does not release the permit; the holder decides when to stop.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

impl fmt::Debug for Permit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permit")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
