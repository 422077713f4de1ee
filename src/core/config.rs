//! # Gate configuration.
//!
//! Provides [`GateConfig`] centralized settings for a [`Gate`](crate::Gate).
//!
//! ## Sentinel values
//! - `backlog = 0` → clamped to 1
//! - `bus_capacity = 0` → clamped to 1

use std::borrow::Cow;

/// Configuration for a gate.
///
/// ## Field semantics
/// - `name`: Gate name attached to every lifecycle event
/// - `backlog`: Capacity of the admission request queue
/// - `bus_capacity`: Event bus ring buffer size
///
/// `backlog` bounds only how many callers can be queued **waiting for the handoff**.
/// It never bounds how many jobs run at once: admission is open or closed, nothing else.
/// A caller that finds the queue full simply waits longer.
#[derive(Clone, Debug)]
pub struct GateConfig {
    /// Gate name (for events and logs).
    pub name: Cow<'static, str>,

    /// Capacity of the admission request queue.
    pub backlog: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe `Lagged`.
    pub bus_capacity: usize,
}

impl GateConfig {
    /// Creates the default configuration with the given gate name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the admission backlog clamped to a minimum of 1.
    #[inline]
    pub fn backlog_clamped(&self) -> usize {
        self.backlog.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for GateConfig {
    /// Default configuration:
    ///
    /// - `name = "gate"`
    /// - `backlog = 1024`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("gate"),
            backlog: 1024,
            bus_capacity: 1024,
        }
    }
}
