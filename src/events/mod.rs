//! Events: dispatchable values, their type identity and failure reports.
//!
//! ## Contents
//! - [`Event`], [`EventType`] event trait and registry key
//! - [`FailureEvent`], [`FailureKind`] reports emitted by the dispatcher itself
//!
//! ## Quick reference
//! - **Publishers**: application code via `Dispatcher::fire`, and the dispatcher
//!   itself (failure reports).
//! - **Consumers**: `Listener<E>` implementations registered for the event type;
//!   `FailureLogger` for [`FailureEvent`] by default.

mod event;
mod failure;

pub use event::{Event, EventType};
pub use failure::{FailureEvent, FailureKind};
