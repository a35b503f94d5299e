//! # typebus
//!
//! **typebus** is a synchronous, type-keyed event dispatcher for Rust.
//!
//! Producers fire strongly-typed events without knowing who listens; listeners
//! subscribe to event types at runtime and expose named handlers. When a listener
//! fails, the failure itself becomes an event ([`FailureEvent`]) dispatched through the
//! same machinery, where a default [`FailureLogger`] logs it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   producer   │   │   producer   │   │   listener   │
//!     │ fire(&Ping)  │   │ fire(&Saved) │   │  (reentrant) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - Registry (EventType → [listener], one reentrant lock)           │
//! │  - Config (failure policy, failure depth, default logger)         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     listener 1         listener 2         listener N     (registration order)
//!     handler(name)      handler(name)      handler(name)
//!        │                  │
//!        │ Err / panic /    │
//!        │ missing handler  │
//!        ▼                  │
//!   FailureEvent ───────────┴──► Dispatcher::fire(&FailureEvent)
//!                                      └──► FailureLogger (tracing::error!)
//! ```
//!
//! ### Failure handling
//! ```text
//! handler body returned Err  → report, continue with next listener
//! handler not found          → report, abort fire with DispatchError
//! handler cannot take event  → report, abort fire with DispatchError
//! handler panicked           → report, abort fire with DispatchError
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Events**        | Any `Send + Sync + Debug` value keyed by its Rust type.      | [`Event`], [`EventType`]                    |
//! | **Listeners**     | Named handlers resolved at fire time; closure listeners.     | [`Listener`], [`Handler`], [`ListenerFn`]   |
//! | **Dispatch**      | Synchronous, in registration order, reentrant-safe.          | [`Dispatcher`], [`Registry`]                |
//! | **Failures**      | Failures redispatched as events, logged by default.          | [`FailureEvent`], [`FailureLogger`]         |
//! | **Errors**        | Typed errors for aborted dispatch.                           | [`DispatchError`]                           |
//! | **Configuration** | Failure policy, failure-report depth, default logger.        | [`Config`], [`FailurePolicy`]               |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use typebus::{Dispatcher, Event, Handler, Listener};
//!
//! #[derive(Debug)]
//! struct Ping;
//! impl Event for Ping {
//!     const HANDLER: &'static str = "on_ping";
//! }
//!
//! #[derive(Default)]
//! struct Counter(AtomicU32);
//!
//! impl Counter {
//!     fn on_ping(&self, _e: &Ping) -> anyhow::Result<()> {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//! }
//!
//! impl Listener<Ping> for Counter {
//!     fn handler(&self, method: &str) -> Option<Handler<Self, Ping>> {
//!         match method {
//!             "on_ping" => Some(Self::on_ping),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new();
//! let counter = Arc::new(Counter::default());
//! dispatcher.register(&counter);
//!
//! dispatcher.fire(&Ping)?;
//! dispatcher.fire_with(&Ping, "on_ping")?;
//! assert_eq!(counter.0.load(Ordering::Relaxed), 2);
//!
//! // unknown handler names are wiring defects
//! assert!(dispatcher.fire_with(&Ping, "on_pong").is_err());
//!
//! dispatcher.unregister_one::<Ping, _>(&counter);
//! dispatcher.fire(&Ping)?;
//! assert_eq!(counter.0.load(Ordering::Relaxed), 2);
//! # Ok::<(), typebus::DispatchError>(())
//! ```
mod core;
mod error;
mod events;
mod listeners;
mod policies;

// ---- Public re-exports ----

pub use crate::core::{Config, Dispatcher, DispatcherBuilder, Registry};
pub use error::DispatchError;
pub use events::{Event, EventType, FailureEvent, FailureKind};
pub use listeners::{FailureLogger, Handler, Listener, ListenerFn, ListenerId};
pub use policies::FailurePolicy;
