//! Video Game Ideas Client
//!
//! Layered architecture:
//! - models: Item and push-event types (wire format)
//! - transport: REST calls and the push channel
//! - store: canonical collection, reducer, fetch/save/live-update wiring
//! - views: headless list and edit pages

pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod transport;
pub mod views;

#[cfg(test)]
mod test_helpers;

pub use config::ClientConfig;
pub use error::{ConfigError, NetworkError, StreamError};
pub use models::{EventKind, Item, ItemEvent};
pub use store::{Action, IdeasState, StoreHandle, SyncStore};
pub use transport::{CloseHandle, EventStream, HttpTransport, Transport};
