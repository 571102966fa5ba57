//! Multicast Events
//!
//! [`Event<T>`] is an ordered list of callbacks invoked synchronously with a
//! `&T` argument. Listeners are identified by a [`ListenerId`] returned from
//! [`Event::subscribe`] and removed explicitly with [`Event::unsubscribe`].
//!
//! # Re-entrancy
//!
//! [`Event::emit`] snapshots the listener list before invoking it, so a
//! callback may freely subscribe, unsubscribe or trigger further emissions.
//! Listeners added during an emission are first called on the next one;
//! listeners removed during an emission still receive the current one.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    /// Handle to a registered listener.
    pub struct ListenerId;
}

type Callback<T> = Rc<dyn Fn(&T)>;

struct Listeners<T: ?Sized> {
    slots: SlotMap<ListenerId, Callback<T>>,
    // Slot reuse would reorder iteration, so insertion order is tracked separately.
    order: Vec<ListenerId>,
}

/// An ordered, single-threaded observer list.
pub struct Event<T: ?Sized> {
    listeners: RefCell<Listeners<T>>,
}

impl<T: ?Sized> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Event<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Listeners {
                slots: SlotMap::with_key(),
                order: Vec::new(),
            }),
        }
    }

    /// Appends a listener; it runs after every listener registered before it.
    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&T) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.slots.insert(Rc::new(callback));
        listeners.order.push(id);
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        if listeners.slots.remove(id).is_none() {
            return false;
        }
        listeners.order.retain(|&existing| existing != id);
        true
    }

    /// Invokes every listener in insertion order.
    pub fn emit(&self, value: &T) {
        let snapshot: SmallVec<[Callback<T>; 4]> = {
            let listeners = self.listeners.borrow();
            listeners
                .order
                .iter()
                .filter_map(|id| listeners.slots.get(*id).cloned())
                .collect()
        };
        for callback in snapshot {
            callback(value);
        }
    }

    /// Drops every listener.
    pub fn clear(&self) {
        let mut listeners = self.listeners.borrow_mut();
        listeners.slots.clear();
        listeners.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("listeners", &self.len())
            .finish()
    }
}
