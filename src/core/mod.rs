//! Gate core: admission, tracking and lifecycle.
//!
//! The public API from this module is [`Gate`] (with [`GateBuilder`], [`GateConfig`],
//! [`GateState`] and [`Permit`]).
//!
//! Internal modules:
//! - [`gate`]: the gate, admission exchange and job submission;
//! - [`controller`]: the lifecycle loop (`Open → Draining → Closed`);
//! - [`tracker`]: pending counter with "wait until zero";
//! - [`permit`]: RAII admission permit;
//! - [`shutdown`]: OS termination signals;
//! - [`builder`], [`config`]: construction and settings.

mod builder;
mod config;
mod controller;
mod gate;
mod permit;
mod shutdown;
mod tracker;

pub use builder::GateBuilder;
pub use config::GateConfig;
pub use gate::{Gate, GateState};
pub use permit::Permit;
