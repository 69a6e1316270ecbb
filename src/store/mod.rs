//! Synchronization Store
//!
//! Owns the canonical collection of ideas. Mounting a [`SyncStore`] starts
//! the initial fetch and the push subscription; consumers get a cloneable
//! [`StoreHandle`] to read snapshots and save items.
//!
//! One cancellation flag per mount guards every state change: once the store
//! is torn down, late fetch results, save results and push events are
//! dropped instead of being applied.

mod state;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::NetworkError;
use crate::models::{EventKind, Item};
use crate::transport::{CloseHandle, EventStream, Transport};

pub use state::{merge_item, reduce, Action, IdeasState};

/// Owner of a mounted store
///
/// Dropping it (or calling [`SyncStore::unmount`]) tears the store down.
pub struct SyncStore {
    handle: StoreHandle,
    close_stream: CloseHandle,
}

impl SyncStore {
    /// Mount a store on `transport`
    ///
    /// Dispatches `FetchStarted` right away, then spawns the fetch and the
    /// push subscription. Must be called from within a tokio runtime.
    pub fn mount(transport: Arc<dyn Transport>) -> Self {
        let (state, _) = watch::channel(IdeasState::default());
        let handle = StoreHandle {
            inner: Arc::new(StoreInner {
                transport,
                state,
                canceled: AtomicBool::new(false),
            }),
        };

        log::info!("fetch items started");
        handle.dispatch(Action::FetchStarted);
        tokio::spawn(handle.clone().fetch_items());

        log::info!("event stream - connecting");
        let stream = handle.inner.transport.open_event_stream();
        let close_stream = stream.close_handle();
        tokio::spawn(handle.clone().apply_events(stream));

        Self {
            handle,
            close_stream,
        }
    }

    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Tear the store down
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        // Flipped under the state lock so no dispatch straddles teardown
        let inner = &self.handle.inner;
        let mut was_canceled = false;
        inner.state.send_if_modified(|_| {
            was_canceled = inner.canceled.swap(true, Ordering::SeqCst);
            false
        });
        if was_canceled {
            return;
        }
        log::info!("event stream - disconnecting");
        self.close_stream.close();
    }
}

impl Drop for SyncStore {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct StoreInner {
    transport: Arc<dyn Transport>,
    state: watch::Sender<IdeasState>,
    canceled: AtomicBool,
}

/// Consumer-facing handle to a mounted store
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<StoreInner>,
}

impl StoreHandle {
    /// Current state
    pub fn snapshot(&self) -> IdeasState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<IdeasState> {
        self.inner.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        !self.inner.canceled.load(Ordering::SeqCst)
    }

    /// Persist an item: update when it has an id, create otherwise
    ///
    /// Resolves after the matching `SaveSucceeded` / `SaveFailed` action has
    /// been dispatched. The error is the same value recorded in
    /// `saving_error`.
    pub async fn save_item(&self, item: Item) -> Result<Item, Arc<NetworkError>> {
        log::info!("save item started");
        self.dispatch(Action::SaveStarted);

        let transport = &self.inner.transport;
        let result = match item.id {
            Some(_) => transport.update_item(&item).await,
            None => transport.create_item(&item).await,
        };

        match result {
            Ok(saved) => {
                log::info!("save item succeeded");
                self.dispatch(Action::SaveSucceeded {
                    item: saved.clone(),
                });
                Ok(saved)
            }
            Err(e) => {
                log::warn!("save item failed: {}", e);
                let error = Arc::new(e);
                self.dispatch(Action::SaveFailed {
                    error: Arc::clone(&error),
                });
                Err(error)
            }
        }
    }

    /// Apply `action` unless the store has been torn down
    ///
    /// The flag is read while holding the state lock, the same lock teardown
    /// takes to set it.
    fn dispatch(&self, action: Action) {
        let canceled = &self.inner.canceled;
        self.inner.state.send_if_modified(|state| {
            if canceled.load(Ordering::SeqCst) {
                log::debug!("store unmounted, dropping {:?}", action);
                return false;
            }
            *state = reduce(std::mem::take(state), action);
            true
        });
    }

    async fn fetch_items(self) {
        match self.inner.transport.list_items().await {
            Ok(items) => {
                log::info!("fetch items succeeded");
                self.dispatch(Action::FetchSucceeded { items });
            }
            Err(e) => {
                log::warn!("fetch items failed: {}", e);
                self.dispatch(Action::FetchFailed { error: Arc::new(e) });
            }
        }
    }

    async fn apply_events(self, mut stream: EventStream) {
        while let Some(event) = stream.next_event().await {
            if !self.is_mounted() {
                break;
            }
            log::info!("event stream message, item {}", event.kind.as_str());
            match event.kind {
                EventKind::Created | EventKind::Updated => {
                    self.dispatch(Action::SaveSucceeded { item: event.item })
                }
                EventKind::Other(_) => {}
            }
        }
        log::debug!("event stream - finished");
    }
}
