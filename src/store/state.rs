//! Store State and Reducer
//!
//! The canonical collection only ever changes through [`reduce`], one
//! [`Action`] at a time.

use std::sync::Arc;

use crate::error::NetworkError;
use crate::models::Item;

/// Published state of the synchronization store
#[derive(Debug, Clone, Default)]
pub struct IdeasState {
    /// `None` until the initial fetch succeeds; `Some(vec![])` means loaded
    /// and empty
    pub items: Option<Vec<Item>>,
    /// True only while the initial fetch is in flight
    pub fetching: bool,
    pub fetching_error: Option<Arc<NetworkError>>,
    /// Reflects the most recently settled save only
    pub saving: bool,
    pub saving_error: Option<Arc<NetworkError>>,
}

impl IdeasState {
    pub fn is_loaded(&self) -> bool {
        self.items.is_some()
    }

    /// Look up an item in the collection by id
    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items
            .as_ref()?
            .iter()
            .find(|item| item.id.as_deref() == Some(id))
    }
}

/// State transitions
#[derive(Debug, Clone)]
pub enum Action {
    FetchStarted,
    FetchSucceeded { items: Vec<Item> },
    FetchFailed { error: Arc<NetworkError> },
    SaveStarted,
    /// Also dispatched for items pushed by the server
    SaveSucceeded { item: Item },
    SaveFailed { error: Arc<NetworkError> },
}

/// Apply one action
pub fn reduce(state: IdeasState, action: Action) -> IdeasState {
    match action {
        Action::FetchStarted => IdeasState {
            fetching: true,
            fetching_error: None,
            ..state
        },
        Action::FetchSucceeded { items } => IdeasState {
            items: Some(items),
            fetching: false,
            ..state
        },
        Action::FetchFailed { error } => IdeasState {
            fetching_error: Some(error),
            fetching: false,
            ..state
        },
        Action::SaveStarted => IdeasState {
            saving: true,
            saving_error: None,
            ..state
        },
        Action::SaveSucceeded { item } => IdeasState {
            items: Some(merge_item(state.items.unwrap_or_default(), item)),
            saving: false,
            ..state
        },
        Action::SaveFailed { error } => IdeasState {
            saving_error: Some(error),
            saving: false,
            ..state
        },
    }
}

/// Merge an incoming item into the collection
///
/// Replaces the entry with the same id in place, or inserts at the front.
/// Applying the same item twice gives the same collection as applying it once.
pub fn merge_item(mut items: Vec<Item>, item: Item) -> Vec<Item> {
    if item.is_draft() {
        log::warn!("merge skipped: item {:?} has no id", item.text);
        return items;
    }
    match items.iter().position(|existing| existing.id == item.id) {
        Some(index) => items[index] = item,
        None => items.insert(0, item),
    }
    items
}
