//! # Dispatchable events and their type identity.
//!
//! Every value handed to [`Dispatcher::fire`](crate::Dispatcher::fire) implements [`Event`].
//! The registry keys listeners by [`EventType`], the runtime type of the event value:
//! two events reach the same listener set iff their concrete Rust types are equal.
//!
//! ## Example
//! ```rust
//! use typebus::{Event, EventType};
//!
//! #[derive(Debug)]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! impl Event for Ping {
//!     const HANDLER: &'static str = "on_ping";
//! }
//!
//! let ty = EventType::of::<Ping>();
//! assert_eq!(ty, EventType::of_val(&Ping { seq: 1 }));
//! assert!(ty.name().ends_with("Ping"));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A value that can be fired through a [`Dispatcher`](crate::Dispatcher).
///
/// Events are only ever passed by shared reference during dispatch, so they
/// stay immutable for every listener that observes them.
pub trait Event: Any + Send + Sync + fmt::Debug {
    /// Handler name used by [`Dispatcher::fire`](crate::Dispatcher::fire).
    ///
    /// Listeners may expose further handlers for the same event type; those are
    /// reached through [`Dispatcher::fire_with`](crate::Dispatcher::fire_with).
    const HANDLER: &'static str;
}

/// Runtime type identity of an event, used as the registry key.
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for logs
/// and error messages.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// Identity of the event type `E`.
    #[inline]
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    /// Identity of the runtime type of `event`.
    #[inline]
    pub fn of_val<E: Event>(_event: &E) -> Self {
        Self::of::<E>()
    }

    /// Fully qualified type name (diagnostics only, not guaranteed stable).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
