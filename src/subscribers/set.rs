//! # Subscriber lanes of a gate.
//!
//! [`SubscriberSet`] gives every subscriber its own lane: a bounded queue and a worker
//! task calling [`Subscribe::on_event`] in order.
//!
//! ```text
//! emit(ev) ──► interested? ──► try_send ──► [lane queue] ──► worker ──► on_event
//!                                 │                            ├─ panic → SubscriberPanicked
//!                                 └─ full/closed               └─ GateClosed → exit
//!                                      → SubscriberOverflow
//! ```
//!
//! ## Rules
//! - `emit` never waits; a full or closed lane loses that event and a
//!   `SubscriberOverflow` report is published (never for an overflow report).
//! - A lane worker exits after the terminal event or once the set is dropped.
//! - Reports go through a weak bus handle: lanes never keep a dropped gate's bus open.
//!
//! Panics are caught with `AssertUnwindSafe`; state a subscriber shares behind a lock
//! may be left half-updated by a panic.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::events::{Bus, Event, EventKind, WeakBus};
use crate::subscribers::Subscribe;

/// Publishes subscriber reports, stamped with the gate name when known.
#[derive(Clone)]
struct Reporter {
    bus: WeakBus,
    gate: Option<Arc<str>>,
}

impl Reporter {
    fn report(&self, ev: Event) {
        let ev = match &self.gate {
            Some(gate) => ev.with_gate(Arc::clone(gate)),
            None => ev,
        };
        self.bus.publish(ev);
    }
}

struct Lane {
    sub: Arc<dyn Subscribe>,
    queue: mpsc::Sender<Arc<Event>>,
}

/// Per-subscriber lanes fed from a gate's events.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    reporter: Reporter,
}

impl SubscriberSet {
    /// Starts one lane worker per subscriber; reports are published on `bus`.
    ///
    /// Must be called inside a tokio runtime when `subs` is not empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: &Bus) -> Self {
        Self::start(subs, bus, None)
    }

    pub(crate) fn for_gate(gate: &str, subs: Vec<Arc<dyn Subscribe>>, bus: &Bus) -> Self {
        Self::start(subs, bus, Some(Arc::from(gate)))
    }

    fn start(subs: Vec<Arc<dyn Subscribe>>, bus: &Bus, gate: Option<Arc<str>>) -> Self {
        let reporter = Reporter {
            bus: bus.downgrade(),
            gate,
        };
        let lanes = subs
            .into_iter()
            .map(|sub| {
                let (queue, inbox) = mpsc::channel(sub.backlog().max(1));
                tokio::spawn(drive_lane(Arc::clone(&sub), inbox, reporter.clone()));
                Lane { sub, queue }
            })
            .collect();
        Self { lanes, reporter }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Returns `true` if the set has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Queues `event` on every interested lane without waiting.
    pub fn emit(&self, event: &Event) {
        let kind = event.kind;
        let event = Arc::new(event.clone());

        for lane in &self.lanes {
            if !kind.is_terminal() && !lane.sub.interested(kind) {
                continue;
            }
            let Err(err) = lane.queue.try_send(Arc::clone(&event)) else {
                continue;
            };
            if kind == EventKind::SubscriberOverflow {
                continue;
            }
            let reason = match err {
                TrySendError::Full(_) => "full",
                TrySendError::Closed(_) => "closed",
            };
            self.reporter
                .report(Event::subscriber_overflow(lane.sub.name(), reason));
        }
    }
}

async fn drive_lane(
    sub: Arc<dyn Subscribe>,
    mut inbox: mpsc::Receiver<Arc<Event>>,
    reporter: Reporter,
) {
    while let Some(ev) = inbox.recv().await {
        let handled = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(payload) = handled {
            reporter.report(Event::subscriber_panicked(
                sub.name(),
                panic_message(payload.as_ref()),
            ));
        }
        if ev.kind.is_terminal() {
            break;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
