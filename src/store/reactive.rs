//! Field-level change notification

use std::fmt;

use ahash::AHashMap;

use crate::store::state::{Field, FieldValue, GameState};

/// Callback invoked with a field's new value
pub type Subscriber = Box<dyn FnMut(&FieldValue)>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owns the game state and dispatches notifications on every `set`
pub struct ReactiveStore {
    state: GameState,
    listeners: AHashMap<Field, Vec<(SubscriptionId, Subscriber)>>,
    next_id: u64,
}

impl ReactiveStore {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            listeners: AHashMap::new(),
            next_id: 0,
        }
    }

    /// Read-only view of the current state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Register a callback for a field. Callbacks of one field run in
    /// registration order.
    pub fn subscribe<F>(&mut self, field: Field, callback: F) -> SubscriptionId
    where
        F: FnMut(&FieldValue) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(field)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subscribers in self.listeners.values_mut() {
            if let Some(pos) = subscribers.iter().position(|(sub, _)| *sub == id) {
                subscribers.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, field: Field) -> usize {
        self.listeners.get(&field).map_or(0, Vec::len)
    }

    /// Mutate one field, then notify its subscribers with the new value
    pub fn set(&mut self, value: FieldValue) {
        let field = value.field();
        self.state.apply(value);
        self.notify(field);
    }

    /// Swap in a whole state without notifying. Follow with `replay`.
    pub fn replace(&mut self, state: GameState) {
        self.state = state;
    }

    /// Notify every field with its current value, as after a load
    pub fn replay(&mut self) {
        for field in Field::ALL {
            self.notify(field);
        }
    }

    fn notify(&mut self, field: Field) {
        let Some(subscribers) = self.listeners.get_mut(&field) else {
            return;
        };
        let value = self.state.get(field);
        for (_, callback) in subscribers.iter_mut() {
            callback(&value);
        }
    }
}

impl fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers: usize = self.listeners.values().map(Vec::len).sum();
        f.debug_struct("ReactiveStore")
            .field("state", &self.state)
            .field("subscribers", &subscribers)
            .finish()
    }
}
