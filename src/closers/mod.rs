//! # Closers: releasing the guarded resource.
//!
//! This module provides the closer types:
//! - [`Close`] - trait for the finalizer run once after draining
//! - [`CloserFn`] - closure-backed closer
//! - [`CloserRef`] - boxed closer owned by the gate

mod close;
mod closer_fn;

pub use close::{Close, CloserRef};
pub use closer_fn::CloserFn;
