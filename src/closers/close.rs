//! # Closer abstraction.
//!
//! A closer releases the resource guarded by a [`Gate`](crate::Gate). The controller
//! calls it exactly once, after admission is closed and every admitted job has
//! released its permit.

use async_trait::async_trait;

use crate::error::CloseError;

/// # Finalizer for the guarded resource.
///
/// Called once, from the controller task, when no job can touch the resource anymore.
/// The failure (if any) is reported as a
/// [`CloserFailed`](crate::EventKind::CloserFailed) event; it cannot reach submitters.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use drainkeeper::{Close, CloseError};
///
/// struct Journal;
///
/// #[async_trait]
/// impl Close for Journal {
///     fn name(&self) -> &str { "journal" }
///
///     async fn close(&mut self) -> Result<(), CloseError> {
///         // flush and release file handles...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Close: Send + 'static {
    /// Returns a human-readable closer name (for events).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Releases the resource.
    async fn close(&mut self) -> Result<(), CloseError>;
}

/// Boxed closer owned by a gate.
pub type CloserRef = Box<dyn Close>;
