//! # Listeners for the dispatcher.
//!
//! This module provides the [`Listener`] trait, listener identity and the built-in
//! implementations.
//!
//! ## Architecture
//! ```text
//! Dispatcher::fire_with(&event, name)
//!     │
//!     ├──► listener 1 ── handler(name) ──► fn(&L1, &E)
//!     ├──► listener 2 ── handler(name) ──► fn(&L2, &E)
//!     │                        └─► Err / None / panic ──► FailureEvent
//!     │                                                     │
//!     └──────────────────────── fire(&FailureEvent) ◄───────┘
//!                                    └──► FailureLogger (default)
//! ```
//!
//! ## Listener types
//! - **Typed listeners**: any type implementing [`Listener<E>`], possibly for many `E`.
//! - **Closures**: [`ListenerFn`] for single-handler listeners.
//! - **Built-in**: [`FailureLogger`], the default sink for failure reports.

mod func;
mod listener;
mod log;

pub use func::ListenerFn;
pub use listener::{Handler, Listener, ListenerId};
pub use log::FailureLogger;

#[cfg(test)]
pub(crate) use log::tests::Captured;
