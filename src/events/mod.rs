//! Gate events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the gate controller and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the controller loop (`Gate::run`); `SubscriberSet` lanes report
//!   overflow and panics through a weak handle that does not keep the bus open.
//! - **Consumers**: the gate's subscriber listener (fans out to `SubscriberSet`) and
//!   any receiver obtained with `Gate::events`.
//!
//! Jobs publish nothing: the submission hot path stays silent.

mod bus;
mod event;

pub use bus::Bus;
pub(crate) use bus::WeakBus;
pub use event::{Event, EventKind};
