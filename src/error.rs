//! Error types returned by the dispatcher.
//!
//! [`DispatchError`] is returned by [`Dispatcher::fire`](crate::Dispatcher::fire) when
//! dispatch has to abort. Every variant is preceded by exactly one
//! [`FailureEvent`](crate::FailureEvent) for the same failure.
//!
//! Handler body errors are **not** returned under the default
//! [`FailurePolicy::Report`](crate::FailurePolicy::Report): they are reported and
//! dispatch continues.

use std::sync::Arc;

use thiserror::Error;

use crate::events::{EventType, FailureKind};

/// # Errors produced by dispatch.
///
/// These indicate a wiring defect (missing handler, handler bound to another event
/// type), an unexpected failure (panic), or, under
/// [`FailurePolicy::Strict`](crate::FailurePolicy::Strict), a failed handler body.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    /// The listener has no handler with the requested name.
    #[error("{listener}.{method}({event}) no method")]
    HandlerNotFound {
        /// Type name of the listener.
        listener: &'static str,
        /// Requested handler name.
        method: String,
        /// Type of the event being fired.
        event: EventType,
    },

    /// The handler exists but cannot accept the event value.
    #[error("{listener}.{method}({event}) wrong event")]
    WrongEvent {
        /// Type name of the listener.
        listener: &'static str,
        /// Requested handler name.
        method: String,
        /// Type of the event being fired.
        event: EventType,
    },

    /// The handler panicked.
    #[error("{listener}.{method}({event}) panicked: {message}")]
    Panicked {
        /// Type name of the listener.
        listener: &'static str,
        /// Requested handler name.
        method: String,
        /// Type of the event being fired.
        event: EventType,
        /// Panic payload rendered as text.
        message: String,
    },

    /// The handler body returned an error (only under `FailurePolicy::Strict`).
    #[error("{listener}.{method}({event}) failed: {cause}")]
    HandlerFailed {
        /// Type name of the listener.
        listener: &'static str,
        /// Requested handler name.
        method: String,
        /// Type of the event being fired.
        event: EventType,
        /// The handler's own error.
        cause: Arc<anyhow::Error>,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typebus::{DispatchError, Event, EventType};
    ///
    /// #[derive(Debug)]
    /// struct Ping;
    /// impl Event for Ping {
    ///     const HANDLER: &'static str = "on_ping";
    /// }
    ///
    /// let err = DispatchError::HandlerNotFound {
    ///     listener: "app::Counter",
    ///     method: "on_pong".into(),
    ///     event: EventType::of::<Ping>(),
    /// };
    /// assert_eq!(err.as_label(), "dispatch_handler_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::HandlerNotFound { .. } => "dispatch_handler_not_found",
            DispatchError::WrongEvent { .. } => "dispatch_wrong_event",
            DispatchError::Panicked { .. } => "dispatch_handler_panicked",
            DispatchError::HandlerFailed { .. } => "dispatch_handler_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::HandlerNotFound {
                listener, method, ..
            } => format!("listener {listener} has no handler {method:?}"),
            DispatchError::WrongEvent {
                listener,
                method,
                event,
            } => format!("handler {listener}.{method} cannot accept {event}"),
            DispatchError::Panicked {
                listener,
                method,
                message,
                ..
            } => format!("handler {listener}.{method} panicked: {message}"),
            DispatchError::HandlerFailed {
                listener,
                method,
                cause,
                ..
            } => format!("handler {listener}.{method} failed: {cause:#}"),
        }
    }

    /// The failure classification reported before this error was returned.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DispatchError::HandlerNotFound { .. } => FailureKind::HandlerNotFound,
            DispatchError::WrongEvent { .. } => FailureKind::WrongEvent,
            DispatchError::Panicked { .. } => FailureKind::Panicked,
            DispatchError::HandlerFailed { .. } => FailureKind::HandlerFailed,
        }
    }
}
