//! # Event subscribers for the gate.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that fans
//! gate events out to every subscriber without blocking the controller loop.
//!
//! ## Architecture
//! ```text
//!   Controller ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                          ┌─────┴─────┐
//!                                                          ▼           ▼
//!                                                      LogWriter    Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use drainkeeper::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, event: &Event) {
//!         if let EventKind::CloserFailed = event.kind {
//!             // page someone
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
