//! Transport Layer
//!
//! Outbound REST calls and the inbound push channel for one resource
//! collection. No business logic and no caching live here.

mod http;
mod stream;
mod websocket;


use async_trait::async_trait;

use crate::error::NetworkResult;
use crate::models::Item;

pub use http::HttpTransport;
pub use stream::{event_channel, CloseHandle, EventSink, EventStream};
pub use websocket::{decode_event, open_websocket_stream};

/// Abstract interface to the remote collection
///
/// Implemented over HTTP + WebSocket by [`HttpTransport`]; the store only
/// talks to this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Read the full collection
    async fn list_items(&self) -> NetworkResult<Vec<Item>>;

    /// Create a draft; returns the server-assigned item
    async fn create_item(&self, draft: &Item) -> NetworkResult<Item>;

    /// Update an existing item addressed by its id
    async fn update_item(&self, item: &Item) -> NetworkResult<Item>;

    /// Open the push channel
    ///
    /// Connection and decode failures are logged by the implementation and
    /// never surface here; a broken channel is simply a stream that ends.
    fn open_event_stream(&self) -> EventStream;
}
