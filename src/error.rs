//! Error types used by the gate and its closers.
//!
//! This module defines two enums:
//!
//! - [`GateError`] — errors returned to callers of the gate itself (submission, run).
//! - [`CloseError`] — errors raised by a closer while releasing the guarded resource.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced by the gate.
///
/// `Closed` is the expected outcome of submitting after shutdown; it is a normal
/// return value, never a panic.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Admission is closed: the work was not run.
    #[error("gate closed: unsuccessful attempt to perform work after stop")]
    Closed,

    /// The controller loop of this gate was already started.
    #[error("gate controller already running")]
    AlreadyRunning,

    /// OS signal listeners could not be installed.
    ///
    /// The gate was still drained and closed before this was returned.
    #[error("shutdown signal unavailable: {error}")]
    Signal {
        /// The underlying I/O error message.
        error: String,
    },
}

impl GateError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use drainkeeper::GateError;
    ///
    /// assert_eq!(GateError::Closed.as_label(), "gate_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            GateError::Closed => "gate_closed",
            GateError::AlreadyRunning => "gate_already_running",
            GateError::Signal { .. } => "gate_signal_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            GateError::Closed => "work submitted after stop".to_string(),
            GateError::AlreadyRunning => "controller already running".to_string(),
            GateError::Signal { error } => format!("signal: {error}"),
        }
    }

    /// Returns `true` if the work was rejected because admission is closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, GateError::Closed)
    }
}

/// # Errors produced by a closer.
///
/// A closer failure never reaches any submitter; the controller reports it as a
/// [`CloserFailed`](crate::EventKind::CloserFailed) event and still finishes.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloseError {
    /// Releasing the resource failed.
    #[error("close failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl CloseError {
    /// Wraps any displayable error as [`CloseError::Failed`].
    ///
    /// # Example
    /// ```
    /// use drainkeeper::CloseError;
    ///
    /// let err = CloseError::failed("disk gone");
    /// assert_eq!(err.to_string(), "close failed: disk gone");
    /// ```
    pub fn failed(error: impl std::fmt::Display) -> Self {
        CloseError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CloseError::Failed { .. } => "close_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CloseError::Failed { error } => format!("error: {error}"),
        }
    }
}
