//! HTTP Transport
//!
//! REST calls against `<base_url>/<collection>` plus the WebSocket push
//! channel, all logged at their start/success/failure boundaries.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::future::Future;

use super::stream::EventStream;
use super::websocket::open_websocket_stream;
use super::Transport;
use crate::config::ClientConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::models::Item;

/// reqwest-backed implementation of [`Transport`]
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> NetworkResult<T> {
        let response = request
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status,
                url: response.url().to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

/// Log `<fn> - started/succeeded/failed` around a request
async fn with_logs<T, F>(fn_name: &str, request: F) -> NetworkResult<T>
where
    F: Future<Output = NetworkResult<T>>,
{
    log::info!("{} - started", fn_name);
    match request.await {
        Ok(value) => {
            log::info!("{} - succeeded", fn_name);
            Ok(value)
        }
        Err(e) => {
            log::warn!("{} - failed: {}", fn_name, e);
            Err(e)
        }
    }
}

/// Saved items must come back carrying an id
fn require_id(item: Item) -> NetworkResult<Item> {
    if item.is_draft() {
        return Err(NetworkError::MissingId);
    }
    Ok(item)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn list_items(&self) -> NetworkResult<Vec<Item>> {
        with_logs("list_items", async {
            let url = self.config.collection_url()?;
            self.send_json(self.client.get(url)).await
        })
        .await
    }

    async fn create_item(&self, draft: &Item) -> NetworkResult<Item> {
        with_logs("create_item", async {
            let url = self.config.collection_url()?;
            let created: Item = self.send_json(self.client.post(url).json(draft)).await?;
            require_id(created)
        })
        .await
    }

    async fn update_item(&self, item: &Item) -> NetworkResult<Item> {
        with_logs("update_item", async {
            let id = item.id.as_deref().ok_or(NetworkError::MissingId)?;
            let url = self.config.item_url(id)?;
            let updated: Item = self.send_json(self.client.put(url).json(item)).await?;
            require_id(updated)
        })
        .await
    }

    fn open_event_stream(&self) -> EventStream {
        match self.config.push_url() {
            Ok(url) => open_websocket_stream(url),
            Err(e) => {
                // Nothing to connect to: hand back a stream that is already over
                log::warn!("web socket onerror: invalid push url: {}", e);
                let (_sink, stream) = super::stream::event_channel();
                stream
            }
        }
    }
}
