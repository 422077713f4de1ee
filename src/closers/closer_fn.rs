//! # Function-backed closer (`CloserFn`)
//!
//! [`CloserFn`] wraps a one-shot closure `F: FnOnce() -> Fut`. Because the closure is
//! consumed on the first call, it can move the resource (or the last sender of a
//! queue) into itself and drop it when closing.
//!
//! ## Example
//! ```rust
//! use drainkeeper::{CloserFn, CloserRef, CloseError};
//!
//! let (tx, _rx) = tokio::sync::mpsc::channel::<u64>(16);
//! let closer: CloserRef = CloserFn::boxed("queue", move || async move {
//!     drop(tx);
//!     Ok::<_, CloseError>(())
//! });
//! assert_eq!(closer.name(), "queue");
//! ```

use std::borrow::Cow;
use std::future::Future;

use async_trait::async_trait;

use crate::closers::close::{Close, CloserRef};
use crate::error::CloseError;

/// Closure-backed closer.
pub struct CloserFn<F> {
    name: Cow<'static, str>,
    f: Option<F>,
}

impl<F> CloserFn<F> {
    /// Creates a new function-backed closer.
    ///
    /// Prefer [`CloserFn::boxed`] when you immediately need a [`CloserRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f: Some(f),
        }
    }
}

impl<F, Fut> CloserFn<F>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), CloseError>> + Send + 'static,
{
    /// Creates the closer and returns it boxed, ready for [`Gate::with_closer`](crate::Gate::with_closer).
    pub fn boxed(name: impl Into<Cow<'static, str>>, f: F) -> CloserRef {
        Box::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Close for CloserFn<F>
where
    F: FnOnce() -> Fut + Send + 'static, // FnOnce: the resource may be moved in
    Fut: Future<Output = Result<(), CloseError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    /// Runs the closure; a second call is a no-op.
    async fn close(&mut self) -> Result<(), CloseError> {
        match self.f.take() {
            Some(f) => f().await,
            None => Ok(()),
        }
    }
}
