//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [controller-started] gate="storage"
//! [shutdown-requested] gate="storage" issued=Some(120) in_flight=Some(3)
//! [drained] gate="storage" issued=Some(123) drain_ms=Some(4)
//! [gate-closed] gate="storage" closer=Some("queue")
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let gate = e.gate.as_deref().unwrap_or("unknown");
        let sub = e.subscriber.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::ControllerStarted => {
                println!("[controller-started] gate={gate:?}");
            }
            EventKind::ShutdownRequested => {
                println!(
                    "[shutdown-requested] gate={gate:?} issued={:?} in_flight={:?}",
                    e.issued, e.in_flight
                );
            }
            EventKind::Drained => {
                println!(
                    "[drained] gate={gate:?} issued={:?} drain_ms={:?}",
                    e.issued, e.drain_ms
                );
            }
            EventKind::CloserFailed => {
                println!("[closer-failed] gate={gate:?} err={:?}", e.reason);
            }
            EventKind::GateClosed => {
                println!("[gate-closed] gate={gate:?} closer={:?}", e.reason);
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] gate={gate:?} subscriber={sub} reason={:?}",
                    e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] gate={gate:?} subscriber={sub} info={}",
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
