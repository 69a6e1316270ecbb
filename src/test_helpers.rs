//! Scripted transport for store tests

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::error::{NetworkError, NetworkResult};
use crate::models::{EventKind, Item, ItemEvent};
use crate::transport::{event_channel, EventSink, EventStream, Transport};

/// How one save call should behave
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveScript {
    pub delay: Duration,
    pub fail: bool,
}

pub fn server_error() -> NetworkError {
    NetworkError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        url: "http://fake/videoGameIdea".to_string(),
    }
}

/// In-memory [`Transport`] whose replies tests control
///
/// Creates assign ids "1", "2", ... in call order; updates echo the item.
#[derive(Default)]
pub struct FakeTransport {
    items: Mutex<Vec<Item>>,
    fail_list: Mutex<bool>,
    pending_list: Mutex<Option<oneshot::Receiver<NetworkResult<Vec<Item>>>>>,
    saves: Mutex<VecDeque<SaveScript>>,
    next_id: AtomicU32,
    sinks: Mutex<Vec<EventSink>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        let next_id = items.len() as u32;
        let fake = Self::default();
        *fake.items.lock().unwrap() = items;
        fake.next_id.store(next_id, Ordering::SeqCst);
        fake
    }

    /// Make the next `list_items` wait until the returned sender fires
    pub fn hold_list(&self) -> oneshot::Sender<NetworkResult<Vec<Item>>> {
        let (tx, rx) = oneshot::channel();
        *self.pending_list.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_list(&self) {
        *self.fail_list.lock().unwrap() = true;
    }

    /// Queue the behavior of the next save call
    pub fn script_save(&self, script: SaveScript) {
        self.saves.lock().unwrap().push_back(script);
    }

    /// Deliver a push event to every open subscription
    ///
    /// Returns how many subscriptions accepted it.
    pub fn push(&self, kind: EventKind, item: Item) -> usize {
        let sinks = self.sinks.lock().unwrap();
        sinks
            .iter()
            .filter(|sink| sink.deliver(ItemEvent::new(kind.clone(), item.clone())))
            .count()
    }

    async fn run_save_script(&self) -> NetworkResult<()> {
        let script = self.saves.lock().unwrap().pop_front().unwrap_or_default();
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        if script.fail {
            return Err(server_error());
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn list_items(&self) -> NetworkResult<Vec<Item>> {
        let pending = self.pending_list.lock().unwrap().take();
        if let Some(reply) = pending {
            return reply.await.expect("list reply sender dropped");
        }
        if *self.fail_list.lock().unwrap() {
            return Err(server_error());
        }
        Ok(self.items.lock().unwrap().clone())
    }

    async fn create_item(&self, draft: &Item) -> NetworkResult<Item> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.run_save_script().await?;
        Ok(Item::with_id(id.to_string(), draft.text.clone()))
    }

    async fn update_item(&self, item: &Item) -> NetworkResult<Item> {
        if item.is_draft() {
            return Err(NetworkError::MissingId);
        }
        self.run_save_script().await?;
        Ok(item.clone())
    }

    fn open_event_stream(&self) -> EventStream {
        let (sink, stream) = event_channel();
        self.sinks.lock().unwrap().push(sink);
        stream
    }
}
