//! Client Models
//!
//! Data structures matching the server's wire format.

use serde::{Deserialize, Serialize};

/// Video game idea (matches backend)
///
/// `id` is `None` for a draft that has not been created on the server yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
}

impl Item {
    /// Create a draft item (no id yet)
    pub fn draft(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }

    /// Create an item with a server-assigned id
    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
        }
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }
}

/// Kind of push event sent by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Updated,
    /// Any event name this client does not act on
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Created => "created",
            EventKind::Updated => "updated",
            EventKind::Other(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "created" => EventKind::Created,
            "updated" => EventKind::Updated,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// Decoded push event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEvent {
    pub kind: EventKind,
    pub item: Item,
}

impl ItemEvent {
    pub fn new(kind: EventKind, item: Item) -> Self {
        Self { kind, item }
    }
}

/// Push message as it appears on the wire:
/// `{ "event": "...", "payload": { "item": { ... } } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub event: String,
    pub payload: PushPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub item: Item,
}

impl From<PushMessage> for ItemEvent {
    fn from(message: PushMessage) -> Self {
        ItemEvent::new(EventKind::from_str(&message.event), message.payload.item)
    }
}
