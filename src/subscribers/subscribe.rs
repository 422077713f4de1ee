//! # Subscriber trait.
//!
//! A gate publishes a handful of events over its whole life: the lifecycle events
//! (`ControllerStarted` … `GateClosed`), plus a `CloserFailed` or a subscriber
//! report now and then. A subscriber sees them in publication order on its own lane,
//! so a slow or failing subscriber delays nobody else and never the controller.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Receiver of gate events.
///
/// `on_event` runs on the subscriber's lane worker. After the gate's terminal event
/// (`GateClosed`) has been handled the worker exits and drops the subscriber.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in subscriber reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether events of `kind` should be queued for this subscriber at all.
    ///
    /// The terminal event is always delivered.
    fn interested(&self, kind: EventKind) -> bool {
        let _ = kind;
        true
    }

    /// Events this subscriber may have queued before further ones are dropped
    /// and reported as `SubscriberOverflow` (minimum 1).
    fn backlog(&self) -> usize {
        16
    }
}
