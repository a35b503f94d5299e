//! # Listener registry - event type to ordered listener set.
//!
//! [`Registry`] owns the `EventType → [listener]` mapping used by the dispatcher.
//!
//! ## Architecture
//! ```text
//! register::<E>(&l)      ──► entries[E].push(l)   (skipped if l already present)
//! unregister_one::<E>(&l) ──► entries[E].retain(≠ l)   (entry stays, even if empty)
//! unregister_all::<E>()  ──► entries.remove(E)
//! snapshot(E)            ──► entries[E].clone()    (dispatcher only)
//! ```
//!
//! ## Rules
//! - A listener appears at most once per event type (identity = `Arc` allocation).
//! - Insertion order is dispatch order.
//! - Entries are created lazily on first registration and removed only by `unregister_all`.
//! - Every operation goes through one [`ReentrantMutex`]; the dispatcher holds it for a
//!   whole `fire`, so other threads wait while the same thread may reenter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::debug;

use crate::core::binding::{Binding, Bound};
use crate::events::{Event, EventType};
use crate::listeners::{Listener, ListenerId};

type Entries = HashMap<EventType, Vec<Arc<dyn Bound>>>;

/// Mapping from event type to its ordered, duplicate-free listener list.
pub struct Registry {
    entries: ReentrantMutex<RefCell<Entries>>,
}

/// Proof that the calling thread holds the registry lock.
pub(crate) type Held<'a> = ReentrantMutexGuard<'a, RefCell<Entries>>;

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: ReentrantMutex::new(RefCell::new(HashMap::new())),
        }
    }

    /// Adds `listener` for events of type `E`.
    ///
    /// Returns `false` if the same listener (by identity) is already registered for `E`.
    pub fn register<E, L>(&self, listener: &Arc<L>) -> bool
    where
        E: Event,
        L: Listener<E>,
    {
        let ty = EventType::of::<E>();
        let id = ListenerId::of(listener);

        let held = self.entries.lock();
        let mut entries = held.borrow_mut();
        let list = entries.entry(ty).or_default();
        if list.iter().any(|b| b.id() == id) {
            return false;
        }

        let bound: Arc<dyn Bound> = Arc::new(Binding::<L, E>::new(Arc::clone(listener)));
        debug!(event = %ty, listener = bound.name(), total = list.len() + 1, "listener registered");
        list.push(bound);
        true
    }

    /// Removes `listener` from the listeners of `E`.
    ///
    /// The entry for `E` is kept even if it becomes empty. Returns `false` if the
    /// listener was not registered.
    pub fn unregister_one<E, L>(&self, listener: &Arc<L>) -> bool
    where
        E: Event,
        L: ?Sized,
    {
        self.unregister_one_of(EventType::of::<E>(), ListenerId::of(listener))
    }

    /// Removes the listener `id` from the listeners of `ty`.
    pub fn unregister_one_of(&self, ty: EventType, id: ListenerId) -> bool {
        let held = self.entries.lock();
        // Released before `removed` drops: a listener's Drop may reenter the registry.
        let removed = {
            let mut entries = held.borrow_mut();
            let Some(list) = entries.get_mut(&ty) else {
                return false;
            };
            let Some(pos) = list.iter().position(|b| b.id() == id) else {
                return false;
            };
            let removed = list.remove(pos);
            debug!(event = %ty, listener = removed.name(), remaining = list.len(), "listener unregistered");
            removed
        };
        drop(removed);
        true
    }

    /// Removes every listener of `E` and the entry itself.
    ///
    /// Returns the number of listeners removed.
    pub fn unregister_all<E: Event>(&self) -> usize {
        self.unregister_all_of(EventType::of::<E>())
    }

    /// Removes every listener of `ty` and the entry itself.
    pub fn unregister_all_of(&self, ty: EventType) -> usize {
        let held = self.entries.lock();
        let Some(list) = held.borrow_mut().remove(&ty) else {
            return 0;
        };
        debug!(event = %ty, removed = list.len(), "listeners cleared");
        list.len()
    }

    /// Number of listeners registered for `E`.
    pub fn len<E: Event>(&self) -> usize {
        self.len_of(EventType::of::<E>())
    }

    /// Number of listeners registered for `ty`.
    pub fn len_of(&self, ty: EventType) -> usize {
        let held = self.entries.lock();
        let entries = held.borrow();
        entries.get(&ty).map_or(0, Vec::len)
    }

    /// True if no listener is registered for any event type.
    pub fn is_empty(&self) -> bool {
        let held = self.entries.lock();
        let entries = held.borrow();
        entries.values().all(Vec::is_empty)
    }

    /// True if `listener` is registered for `E`.
    pub fn contains<E, L>(&self, listener: &Arc<L>) -> bool
    where
        E: Event,
        L: ?Sized,
    {
        let id = ListenerId::of(listener);
        self.listener_ids_of(EventType::of::<E>()).contains(&id)
    }

    /// True if an entry exists for `ty`, even an empty one.
    pub fn has_entry(&self, ty: EventType) -> bool {
        let held = self.entries.lock();
        let entries = held.borrow();
        entries.contains_key(&ty)
    }

    /// Event types that currently have an entry, in no particular order.
    pub fn event_types(&self) -> Vec<EventType> {
        let held = self.entries.lock();
        let entries = held.borrow();
        entries.keys().copied().collect()
    }

    /// Listener identities registered for `E`, in dispatch order.
    pub fn listener_ids<E: Event>(&self) -> Vec<ListenerId> {
        self.listener_ids_of(EventType::of::<E>())
    }

    /// Listener identities registered for `ty`, in dispatch order.
    pub fn listener_ids_of(&self, ty: EventType) -> Vec<ListenerId> {
        self.snapshot(ty).iter().map(|b| b.id()).collect()
    }

    /// Acquires the registry lock for the calling thread.
    ///
    /// Reentrant: the holder may keep calling any registry method.
    pub(crate) fn hold(&self) -> Held<'_> {
        self.entries.lock()
    }

    /// Point-in-time copy of the listeners of `ty`, in dispatch order.
    pub(crate) fn snapshot(&self, ty: EventType) -> Vec<Arc<dyn Bound>> {
        let held = self.entries.lock();
        let entries = held.borrow();
        entries.get(&ty).cloned().unwrap_or_default()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let held = self.entries.lock();
        let entries = held.borrow();
        let mut map = f.debug_map();
        for (ty, list) in entries.iter() {
            map.entry(ty, &list.len());
        }
        map.finish()
    }
}
