//! # Lifecycle events emitted by the gate.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Lifecycle events**: controller transitions (started, shutdown, drained, closer outcome)
//! - **Subscriber events**: delivery problems inside the fan-out set
//!
//! The [`Event`] struct carries additional metadata such as timestamps, gate name,
//! reasons, and drain statistics.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use drainkeeper::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Drained)
//!     .with_gate("storage")
//!     .with_issued(42)
//!     .with_drain(Duration::from_millis(7));
//!
//! assert_eq!(ev.kind, EventKind::Drained);
//! assert_eq!(ev.gate.as_deref(), Some("storage"));
//! assert_eq!(ev.issued, Some(42));
//! assert_eq!(ev.drain_ms, Some(7));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of gate events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: `subscriber=<name> reason=<full|closed>`
    SubscriberOverflow,

    // === Lifecycle events ===
    /// Controller loop started offering permits (state `Open`).
    ///
    /// Sets:
    /// - `gate`: gate name
    ControllerStarted,

    /// Shutdown signal observed; admission closed (state `Draining`).
    ///
    /// Sets:
    /// - `gate`: gate name
    /// - `issued`: permits issued so far
    /// - `in_flight`: permits still held by jobs
    ShutdownRequested,

    /// Every issued permit was released.
    ///
    /// Sets:
    /// - `gate`: gate name
    /// - `issued`: total permits issued
    /// - `drain_ms`: time spent draining (ms)
    Drained,

    /// Closer returned an error; the gate still goes on to `Closed`.
    ///
    /// Sets:
    /// - `gate`: gate name
    /// - `reason`: closer error message
    CloserFailed,

    /// Closer has run (or there was none); terminal event (state `Closed`).
    ///
    /// Sets:
    /// - `gate`: gate name
    /// - `reason`: closer name, if a closer was configured
    GateClosed,
}

impl EventKind {
    /// Returns `true` for the last event a gate ever publishes.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::GateClosed)
    }
}

/// Gate event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Name of the gate.
    pub gate: Option<Arc<str>>,
    /// Name of the subscriber a delivery problem concerns.
    pub subscriber: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Number of permits issued by the controller.
    pub issued: Option<u64>,
    /// Number of permits still held by jobs.
    pub in_flight: Option<u64>,
    /// Drain duration in milliseconds (compact).
    pub drain_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            gate: None,
            subscriber: None,
            reason: None,
            issued: None,
            in_flight: None,
            drain_ms: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a gate name.
    #[inline]
    pub fn with_gate(mut self, gate: impl Into<Arc<str>>) -> Self {
        self.gate = Some(gate.into());
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, subscriber: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(subscriber.into());
        self
    }

    /// Attaches the number of issued permits.
    #[inline]
    pub fn with_issued(mut self, n: u64) -> Self {
        self.issued = Some(n);
        self
    }

    /// Attaches the number of in-flight permits.
    #[inline]
    pub fn with_in_flight(mut self, n: u64) -> Self {
        self.in_flight = Some(n);
        self
    }

    /// Attaches a drain duration (stored as milliseconds).
    #[inline]
    pub fn with_drain(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.drain_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }
}
