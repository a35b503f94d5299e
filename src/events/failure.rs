//! # Failure reports produced by the dispatcher.
//!
//! When a listener fails during dispatch, the dispatcher builds a [`FailureEvent`] and
//! fires it through itself with the `on_failure` handler. The default
//! [`FailureLogger`](crate::FailureLogger) listener logs it; applications may register
//! their own `Listener<FailureEvent>` next to it or instead of it.
//!
//! ## Kinds
//! | kind              | cause                                     | outcome of the original `fire` |
//! |-------------------|-------------------------------------------|--------------------------------|
//! | `HandlerFailed`   | handler body returned `Err`               | continues with next listener   |
//! | `HandlerNotFound` | listener has no handler with that name    | aborts                         |
//! | `WrongEvent`      | handler bound to a different event type   | aborts                         |
//! | `Panicked`        | handler panicked                          | aborts                         |
//!
//! ## Ordering
//! Each report has a global, monotonically increasing `seq`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::events::{Event, EventType};
use crate::listeners::ListenerId;

/// Global sequence counter for failure ordering.
static FAILURE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of a dispatch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The handler body returned an error.
    HandlerFailed,
    /// No handler with the requested name exists on the listener.
    HandlerNotFound,
    /// The handler could not accept the event value.
    WrongEvent,
    /// The handler panicked.
    Panicked,
}

impl FailureKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureKind::HandlerFailed => "handler_failed",
            FailureKind::HandlerNotFound => "handler_not_found",
            FailureKind::WrongEvent => "wrong_event",
            FailureKind::Panicked => "handler_panicked",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Report of a listener failure during dispatch.
///
/// - `seq`: monotonic global sequence
/// - `at`: wall-clock timestamp (for logs)
/// - `kind`: failure classification
/// - `event_type`: type of the event whose dispatch failed
#[derive(Clone)]
pub struct FailureEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Failure classification.
    pub kind: FailureKind,
    /// Type of the event being dispatched when the failure happened.
    pub event_type: EventType,

    listener: Arc<dyn Any + Send + Sync>,
    listener_id: ListenerId,
    cause: Arc<anyhow::Error>,
    origin_class: &'static str,
    origin_method: Arc<str>,
}

impl FailureEvent {
    /// Creates a report for a failure of `listener`'s `method` handler.
    pub fn for_listener<L: Any + Send + Sync>(
        kind: FailureKind,
        event_type: EventType,
        listener: &Arc<L>,
        method: &str,
        cause: anyhow::Error,
    ) -> Self {
        Self::from_parts(
            kind,
            event_type,
            Arc::clone(listener) as Arc<dyn Any + Send + Sync>,
            std::any::type_name::<L>(),
            method,
            Arc::new(cause),
        )
    }

    pub(crate) fn from_parts(
        kind: FailureKind,
        event_type: EventType,
        listener: Arc<dyn Any + Send + Sync>,
        origin_class: &'static str,
        origin_method: &str,
        cause: Arc<anyhow::Error>,
    ) -> Self {
        let listener_id = ListenerId::of(&listener);
        Self {
            seq: FAILURE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            event_type,
            listener,
            listener_id,
            cause,
            origin_class,
            origin_method: origin_method.into(),
        }
    }

    /// The listener whose handler failed.
    #[inline]
    pub fn listener(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.listener
    }

    /// Identity of the listener whose handler failed.
    #[inline]
    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    /// True if the failure originates from `listener`.
    #[inline]
    pub fn is_from<L: ?Sized>(&self, listener: &Arc<L>) -> bool {
        self.listener_id == ListenerId::of(listener)
    }

    /// The error that caused the failure (the handler's own error for `HandlerFailed`).
    #[inline]
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }

    /// Type name of the failing listener.
    #[inline]
    pub fn origin_class(&self) -> &'static str {
        self.origin_class
    }

    /// Handler name that was being invoked.
    #[inline]
    pub fn origin_method(&self) -> &str {
        &self.origin_method
    }

    /// True for handler body errors, which `fire` continues past under
    /// [`FailurePolicy::Report`](crate::FailurePolicy::Report).
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind, FailureKind::HandlerFailed)
    }
}

impl Event for FailureEvent {
    const HANDLER: &'static str = "on_failure";
}

impl fmt::Debug for FailureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureEvent")
            .field("seq", &self.seq)
            .field("kind", &self.kind)
            .field("event_type", &self.event_type)
            .field("listener", &self.listener_id)
            .field("origin_class", &self.origin_class)
            .field("origin_method", &self.origin_method)
            .field("cause", &format_args!("{:#}", self.cause))
            .finish()
    }
}
