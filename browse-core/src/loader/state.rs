use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};

use crate::item::{Continuation, Item};

/// Snapshots a subscriber may leave unread before it gets dropped.
pub(crate) const SUBSCRIBER_BACKLOG: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    HasMore,
    Exhausted,
}

/// Immutable snapshot of everything a loader has loaded so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoaderState {
    pub title: Option<String>,
    pub items: Vec<Item>,
    pub is_loading: bool,
    pub continuation: Option<Continuation>,
    pub can_load_more: bool,
    loaded: bool,
}

impl LoaderState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.can_load_more {
            Phase::HasMore
        } else if self.loaded {
            Phase::Exhausted
        } else {
            Phase::Uninitialized
        }
    }

    /// Consumer-side pagination trigger: `last_visible` is the index of the
    /// last rendered item, more is wanted once it gets within `lookahead`
    /// items of the end.
    pub fn wants_more(&self, last_visible: usize, lookahead: usize) -> bool {
        self.can_load_more
            && !self.is_loading
            && last_visible.saturating_add(lookahead) >= self.items.len()
    }

    pub(crate) fn loading(&self) -> Self {
        Self {
            is_loading: true,
            ..self.clone()
        }
    }

    pub(crate) fn idle(&self) -> Self {
        Self {
            is_loading: false,
            ..self.clone()
        }
    }

    /// Full reset with the first page of a listing.
    pub(crate) fn replaced(
        title: Option<String>,
        items: Vec<Item>,
        continuation: Option<Continuation>,
    ) -> Self {
        Self {
            title,
            items,
            is_loading: false,
            can_load_more: continuation.is_some(),
            continuation,
            loaded: true,
        }
    }

    pub(crate) fn appended(&self, items: Vec<Item>, continuation: Option<Continuation>) -> Self {
        let mut merged = Vec::with_capacity(self.items.len() + items.len());
        merged.extend(self.items.iter().cloned());
        merged.extend(items);
        Self {
            title: self.title.clone(),
            items: merged,
            is_loading: false,
            can_load_more: continuation.is_some(),
            continuation,
            loaded: true,
        }
    }
}

/// Latest snapshot plus the channels it gets pushed to.  Only the loader
/// actor writes, any thread may read.
pub(crate) struct SharedState {
    current: RwLock<Arc<LoaderState>>,
    subscribers: Mutex<Vec<Sender<Arc<LoaderState>>>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(LoaderState::default())),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self) -> Arc<LoaderState> {
        self.current.read().clone()
    }

    /// Subscribers that fall `SUBSCRIBER_BACKLOG` snapshots behind are
    /// disconnected, their stream ends after the queued snapshots.
    pub fn subscribe(&self) -> Receiver<Arc<LoaderState>> {
        let (sender, receiver) = bounded(SUBSCRIBER_BACKLOG);
        // Hold the subscriber list while reading, so a concurrent publish
        // can't slip in between the initial snapshot and the registration.
        let mut subscribers = self.subscribers.lock();
        let _ = sender.try_send(self.get());
        subscribers.push(sender);
        receiver
    }

    pub fn publish(&self, state: LoaderState) {
        let state = Arc::new(state);
        let mut subscribers = self.subscribers.lock();
        *self.current.write() = state.clone();
        subscribers.retain(|sender| match sender.try_send(state.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("subscriber fell behind, dropping it");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}
