use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    closers::CloserRef,
    core::GateConfig,
    events::{Bus, Event},
    subscribers::{Subscribe, SubscriberSet},
};
use super::gate::Gate;

/// Builder for constructing a [`Gate`] with optional features.
pub struct GateBuilder {
    cfg: GateConfig,
    closer: Option<CloserRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl GateBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: GateConfig) -> Self {
        Self {
            cfg,
            closer: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the closer run once after draining. Without one, closing is a no-op.
    pub fn with_closer(mut self, closer: CloserRef) -> Self {
        self.closer = Some(closer);
        self
    }

    /// Sets event subscribers, each fed through its own bounded lane.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the gate. The controller is not started.
    ///
    /// With subscribers configured this spawns tasks, so it must be called inside a
    /// tokio runtime. Those tasks end after `GateClosed`, or when the gate is dropped.
    pub fn build(self) -> Arc<Gate> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::for_gate(&self.cfg.name, self.subscribers, &bus);
            tokio::spawn(feed_subscribers(bus.subscribe(), set));
        }
        Arc::new(Gate::new_internal(self.cfg, bus, self.closer))
    }
}

/// Forwards the gate's events to its subscriber lanes.
///
/// Stops after the terminal event, or once the gate (the only strong bus handle) is gone.
async fn feed_subscribers(mut rx: broadcast::Receiver<Event>, set: SubscriberSet) {
    loop {
        let ev = match rx.recv().await {
            Ok(ev) => ev,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return,
        };
        set.emit(&ev);
        if ev.kind.is_terminal() {
            return;
        }
    }
}
