#![forbid(unsafe_code)]

//! Listener registry for layout-changed notifications.
//!
//! The engine broadcasts a layout-changed event whenever the container is
//! re-measured after a resize or a precision change. [`Listeners`] is the
//! subscription half of that contract: callers register a callback and get
//! back a [`SubscriptionId`] they can later use to unsubscribe.
//!
//! # Design
//!
//! The engine is single-threaded and cooperative (one logical thread mutates
//! shared state at a time), so listeners are plain `FnMut` boxes with no
//! `Send` bound and no channel machinery. Emission runs every callback
//! synchronously, in subscription order, to completion.
//!
//! # Invariants
//!
//! 1. Subscription ids are unique for the lifetime of the registry and are
//!    never reused, even after unsubscription.
//! 2. `emit` invokes callbacks in subscription order.
//! 3. Unsubscribing an unknown id is a no-op returning `false`.

/// Identifier handed out by [`Listeners::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A registry of event callbacks with id-based unsubscribe.
pub struct Listeners<E> {
    next_id: u64,
    entries: Vec<(u64, Box<dyn FnMut(&E)>)>,
}

impl<E> Listeners<E> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register a callback; returns the handle needed to unsubscribe.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    /// Remove a callback. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id.0);
        self.entries.len() != before
    }

    /// Invoke every callback with the event, in subscription order.
    pub fn emit(&mut self, event: &E) {
        for (_, callback) in &mut self.entries {
            callback(event);
        }
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all callbacks.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
