//! Headless Views
//!
//! Text renditions of the list page and the edit page. They only read store
//! snapshots; saving goes through the [`StoreHandle`](crate::store::StoreHandle).

use crate::models::Item;
use crate::store::IdeasState;

pub const FETCHING_MESSAGE: &str = "Fetching video game ideas";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch video game ideas";
pub const SAVING_MESSAGE: &str = "Saving...";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save video game idea";

/// Lines for the list page
pub fn list_lines(state: &IdeasState) -> Vec<String> {
    let mut lines = Vec::new();
    if state.fetching {
        lines.push(FETCHING_MESSAGE.to_string());
    }
    if let Some(items) = &state.items {
        lines.extend(items.iter().map(|item| {
            format!("[{}] {}", item.id.as_deref().unwrap_or("?"), item.text)
        }));
    }
    if let Some(error) = &state.fetching_error {
        lines.push(format!("{}: {}", FETCH_FAILED_MESSAGE, error));
    }
    lines
}

/// Edit page state: either an existing item or a new draft
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    route_id: Option<String>,
    item: Option<Item>,
    text: String,
}

impl EditSession {
    /// Open the page for `route_id` (`None` for a new idea)
    pub fn open(route_id: Option<&str>, items: Option<&[Item]>) -> Self {
        let mut session = Self {
            route_id: route_id.map(str::to_string),
            ..Default::default()
        };
        session.sync(items);
        session
    }

    /// Re-resolve the edited item after the collection changed
    ///
    /// When the item is found its current text replaces the typed text.
    pub fn sync(&mut self, items: Option<&[Item]>) {
        let route_id = self.route_id.as_deref().unwrap_or("");
        self.item = items
            .and_then(|items| items.iter().find(|it| it.id.as_deref() == Some(route_id)))
            .cloned();
        if let Some(item) = &self.item {
            self.text = item.text.clone();
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_new(&self) -> bool {
        self.item.is_none()
    }

    /// Item to hand to `save_item`
    pub fn edited_item(&self) -> Item {
        match &self.item {
            Some(item) => Item {
                text: self.text.clone(),
                ..item.clone()
            },
            None => Item::draft(self.text.clone()),
        }
    }

    /// Status lines under the edit form
    pub fn status_lines(state: &IdeasState) -> Vec<String> {
        let mut lines = Vec::new();
        if state.saving {
            lines.push(SAVING_MESSAGE.to_string());
        }
        if let Some(error) = &state.saving_error {
            lines.push(format!("{}: {}", SAVE_FAILED_MESSAGE, error));
        }
        lines
    }
}
