//! # drainkeeper
//!
//! **drainkeeper** guards a shared, closable resource against being released while
//! concurrent jobs still use it.
//!
//! Callers run short async jobs through a [`Gate`]. The gate guarantees that:
//! - once shutdown is requested, no new job is admitted;
//! - every job already admitted is allowed to finish;
//! - the closer runs **exactly once**, after the last admitted job has finished.
//!
//! Admission is binary (open or closed). The gate is not a rate limiter or a worker
//! pool: any number of admitted jobs run in parallel.
//!
//! ## Architecture
//! ```text
//!   submit(work)   submit(work)   submit_with_token(work)
//!        │              │                   │
//!        ▼              ▼                   ▼
//! ┌─────────────────────────────────────────────────────┐
//! │ Admission exchange (request queue + oneshot reply)  │
//! └─────────────────────────┬───────────────────────────┘
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │ Controller loop (Gate::run)                         │
//! │  - issues Permits, counts them in the tracker       │
//! │  - on shutdown token: closes admission, drains      │
//! │  - calls the closer once, publishes GateClosed      │
//! └─────────────────────────┬───────────────────────────┘
//!                           ▼
//!                 Bus ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ## Lifecycle
//! ```text
//! Open ──(shutdown token)──► Draining ──(tracker == 0)──► Closed (closer ran)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                      |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Gate**          | Admission, draining, exactly-once close.                 | [`Gate`], [`Permit`], [`GateState`]     |
//! | **Closers**       | Release the guarded resource.                            | [`Close`], [`CloserFn`]                 |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, alerts).   | [`Subscribe`], [`SubscriberSet`]        |
//! | **Errors**        | Typed errors for the gate and closers.                   | [`GateError`], [`CloseError`]           |
//! | **Configuration** | Name, admission backlog, bus capacity.                   | [`GateConfig`], [`GateBuilder`]         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use drainkeeper::{CloserFn, Gate, GateConfig, GateError, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), GateError> {
//!     let (tx, mut rx) = tokio::sync::mpsc::channel::<u32>(16);
//!     let producer = tx.clone();
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(drainkeeper::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     // The closer drops the last sender: the queue closes only after every push landed.
//!     let gate = Gate::builder(GateConfig::named("queue"))
//!         .with_closer(CloserFn::boxed("queue", move || async move {
//!             drop(tx);
//!             Ok::<(), drainkeeper::CloseError>(())
//!         }))
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let token = CancellationToken::new();
//!     let controller = tokio::spawn({
//!         let (gate, token) = (gate.clone(), token.clone());
//!         async move { gate.run(token).await }
//!     });
//!
//!     gate.submit(|| async { producer.send(7).await.is_ok() }).await?;
//!     drop(producer);
//!
//!     token.cancel();
//!     controller.await.expect("controller task")?;
//!
//!     assert_eq!(rx.recv().await, Some(7));
//!     assert_eq!(rx.recv().await, None);
//!     Ok(())
//! }
//! ```
mod closers;
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use closers::{Close, CloserFn, CloserRef};
pub use crate::core::{Gate, GateBuilder, GateConfig, GateState, Permit};
pub use error::{CloseError, GateError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
