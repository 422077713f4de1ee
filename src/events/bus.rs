//! # Gate event bus.
//!
//! Every gate owns one [`Bus`]. The controller publishes the lifecycle events on it;
//! the subscriber workers report delivery problems on it through a [`WeakBus`].
//!
//! ```text
//! Gate::run ──► Bus (strong) ──┬──► subscriber listener ──► SubscriberSet lanes
//!                    ▲         └──► Gate::events() receivers
//! lane workers ──► WeakBus (upgrade per report)
//! ```
//!
//! Only the gate holds a strong sender. Once the gate is dropped the channel closes,
//! every receiver sees `RecvError::Closed`, and the listener and its workers wind down.
//!
//! Publishing never waits. A receiver that falls behind the ring buffer gets
//! `RecvError::Lagged(n)`; events published while nobody listens are gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for the events of one gate.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus keeping up to `capacity` unread events per receiver (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev` to the current receivers, if any.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver of events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns a handle that can publish without keeping the bus open.
    pub(crate) fn downgrade(&self) -> WeakBus {
        WeakBus {
            tx: self.tx.downgrade(),
        }
    }
}

/// Publishing handle that does not keep the bus alive.
#[derive(Clone)]
pub(crate) struct WeakBus {
    tx: broadcast::WeakSender<Event>,
}

impl WeakBus {
    /// Publishes `ev` if the bus is still open; otherwise drops it.
    pub(crate) fn publish(&self, ev: Event) {
        if let Some(tx) = self.tx.upgrade() {
            let _ = tx.send(ev);
        }
    }
}
