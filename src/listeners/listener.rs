//! # Listener trait and listener identity.
//!
//! A listener is any `Send + Sync` value that implements [`Listener<E>`] for one or
//! more event types. For each event type it exposes one or more **named handlers**;
//! the dispatcher resolves the handler by name at fire time.
//!
//! ## Resolution
//! ```text
//! Dispatcher::fire_with(&event, "on_ping")
//!     └─► listener.handler("on_ping")
//!            ├─ Some(fn(&L, &Ping)) ─► invoke(listener, &event)
//!            └─ None               ─► HandlerNotFound (fatal)
//! ```
//!
//! ## Identity
//! Listeners are registered as `Arc<L>`. Two registrations are the same entry iff
//! they point at the same allocation ([`ListenerId`]); structural equality is never
//! consulted.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use typebus::{Event, Handler, Listener};
//!
//! #[derive(Debug)]
//! struct Click { x: i32, y: i32 }
//! impl Event for Click {
//!     const HANDLER: &'static str = "on_click";
//! }
//!
//! #[derive(Default)]
//! struct Mouse { clicks: AtomicUsize, doubles: AtomicUsize }
//!
//! impl Mouse {
//!     fn on_click(&self, _e: &Click) -> anyhow::Result<()> {
//!         self.clicks.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//!
//!     fn on_double_click(&self, _e: &Click) -> anyhow::Result<()> {
//!         self.doubles.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//! }
//!
//! impl Listener<Click> for Mouse {
//!     fn handler(&self, method: &str) -> Option<Handler<Self, Click>> {
//!         match method {
//!             "on_click" => Some(Self::on_click),
//!             "on_double_click" => Some(Self::on_double_click),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::events::Event;

/// Handler bound to a listener type `L` for events of type `E`.
///
/// Returning `Err` marks a failure of the handler body: it is reported as a
/// [`FailureEvent`](crate::FailureEvent) and dispatch moves on to the next listener.
pub type Handler<L, E> = fn(&L, &E) -> anyhow::Result<()>;

/// Subscriber for events of type `E`.
///
/// ### Implementation requirements
/// - Resolve handler names without side effects; `handler` may be called once per fire.
/// - Report failures via `Err`; a panic is treated as an unexpected failure and aborts
///   the whole `fire` call.
pub trait Listener<E: Event>: Send + Sync + 'static {
    /// Returns the handler registered under `method`, if any.
    fn handler(&self, method: &str) -> Option<Handler<Self, E>>
    where
        Self: Sized;

    /// Returns the listener name used in logs and failure reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Identity of a registered listener (address of its `Arc` allocation).
///
/// Stable for as long as at least one `Arc` to the listener is alive; the registry
/// holds one for every registration.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    /// Identity of the listener behind `listener`.
    #[inline]
    pub fn of<L: ?Sized>(listener: &Arc<L>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({:#x})", self.0)
    }
}
