//! Change notification for record identifiers.
//!
//! # Responsibility
//! - Keep the set of observers registered per identifier.
//! - Deliver a bare identifier to every matching observer after a write.
//!
//! # Invariants
//! - Delivery is synchronous on the notifying thread; no queue sits
//!   between the write and its observers.
//! - Observers are called with the registry lock released, so they may
//!   re-query or (un)register from inside `on_change`.
//! - A panicking observer is contained and logged; it never changes the
//!   outcome of the write that triggered it.

use crate::uri::ContentUri;
use crossbeam::channel as chan;
use log::{debug, warn};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Receives change events. Observers re-read to learn the new state.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, uri: &ContentUri);
}

impl<F> ChangeObserver for F
where
    F: Fn(&ContentUri) + Send + Sync,
{
    fn on_change(&self, uri: &ContentUri) {
        self(uri)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

struct Registration {
    id: ObserverId,
    uri: ContentUri,
    observer: Arc<dyn ChangeObserver>,
}

impl Registration {
    /// Same identifier, or one is an ancestor of the other.
    fn matches(&self, changed: &ContentUri) -> bool {
        self.uri == *changed
            || self.uri.is_ancestor_of(changed)
            || changed.is_ancestor_of(&self.uri)
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    registrations: Vec<Registration>,
}

/// Process-local observer registry.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` for `uri`.
    ///
    /// Changes to `uri`, to identifiers beneath it and to its ancestors are
    /// delivered.
    pub fn register(&self, uri: ContentUri, observer: Arc<dyn ChangeObserver>) -> ObserverId {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = ObserverId(registry.next_id);
        registry.registrations.push(Registration {
            id,
            uri,
            observer,
        });
        id
    }

    /// Removes a registration. Returns `false` when `id` was not registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut registry = self.registry.lock();
        let before = registry.registrations.len();
        registry.registrations.retain(|registration| registration.id != id);
        registry.registrations.len() != before
    }

    /// Registers a channel-backed observer for `uri`.
    ///
    /// The registration is removed when the subscription is dropped.
    pub fn subscribe(&self, uri: ContentUri) -> ChangeSubscription {
        let (sender, receiver) = chan::unbounded();
        let id = self.register(uri, Arc::new(ChannelObserver { sender }));
        ChangeSubscription {
            id,
            notifier: self.clone(),
            receiver,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.registry.lock().registrations.len()
    }

    /// Delivers `uri` to every matching observer.
    ///
    /// Returns the number of observers that handled the event without
    /// panicking.
    pub fn notify(&self, uri: &ContentUri) -> usize {
        let targets: Vec<(ObserverId, Arc<dyn ChangeObserver>)> = {
            let registry = self.registry.lock();
            registry
                .registrations
                .iter()
                .filter(|registration| registration.matches(uri))
                .map(|registration| (registration.id, Arc::clone(&registration.observer)))
                .collect()
        };

        let mut delivered = 0;
        for (id, observer) in &targets {
            match catch_unwind(AssertUnwindSafe(|| observer.on_change(uri))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(
                    "event=observer_failed module=notify status=error observer_id={}",
                    id.0
                ),
            }
        }

        debug!(
            "event=change_notify module=notify status=ok observers={} delivered={}",
            targets.len(),
            delivered
        );
        delivered
    }
}

struct ChannelObserver {
    sender: chan::Sender<ContentUri>,
}

impl ChangeObserver for ChannelObserver {
    fn on_change(&self, uri: &ContentUri) {
        // Receiver gone means the subscription is being dropped.
        let _ = self.sender.send(uri.clone());
    }
}

/// Channel-backed registration owned by a reader.
pub struct ChangeSubscription {
    id: ObserverId,
    notifier: ChangeNotifier,
    receiver: chan::Receiver<ContentUri>,
}

impl ChangeSubscription {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Drains pending events; returns whether any arrived.
    pub fn has_changed(&self) -> bool {
        self.receiver.try_iter().count() > 0
    }

    /// Pending and future change events.
    pub fn changes(&self) -> &chan::Receiver<ContentUri> {
        &self.receiver
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.notifier.unregister(self.id);
    }
}
