//! Change notification with scoped subscriptions.
//!
//! Views register a callback with [`ChangeNotifier::subscribe`] and keep the
//! returned [`Subscription`] alive for as long as they want updates. Dropping
//! it unregisters the callback.
//!
//! Callbacks run without the registry lock held, so they may subscribe,
//! drop subscriptions or notify again. A callback is never re-entered: a
//! nested event does not reach the callback that is currently running.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, TryLockError, Weak};

use serde::{Deserialize, Serialize};

/// Which part of the editor state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeEvent {
    /// Components or categories.
    Registry,
    /// The category chosen in the component panel.
    SelectedCategory,
    /// Placements (transform, order, visibility, names, membership).
    Placements,
    /// The selection set.
    Selection,
    /// Global canvas options.
    Options,
    /// Surface size.
    Surface,
    /// The rename field opened, changed or closed.
    Rename,
    /// The gesture state changed.
    Gesture,
}

type Callback = Arc<Mutex<dyn FnMut(ChangeEvent) + Send>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// Fan-out of [`ChangeEvent`]s to registered callbacks.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    listeners: Arc<Mutex<Listeners>>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl FnMut(ChangeEvent) + Send + 'static) -> Subscription {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners
            .callbacks
            .insert(id, Arc::new(Mutex::new(callback)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver an event to every subscriber in registration order.
    ///
    /// Subscribers removed by an earlier callback in the same dispatch are
    /// skipped.
    pub fn notify(&self, event: ChangeEvent) {
        let snapshot: Vec<(u64, Callback)> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();

        for (id, callback) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            let mut callback = match callback.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    tracing::trace!("Skipping re-entrant {event:?} for subscriber {id}");
                    continue;
                }
            };
            (*callback)(event);
        }
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .contains_key(&id)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .len()
    }
}

/// Handle keeping a callback registered.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .callbacks
                .remove(&self.id);
        }
    }
}
