//! Client Configuration
//!
//! Server locations, stored as a small JSON file next to the app data.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_COLLECTION: &str = "videoGameIdea";
const DEFAULT_PUSH_URL: &str = "ws://localhost:3000";

/// Where the REST collection and the push channel live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base HTTP url of the server
    pub base_url: String,
    /// Name of the REST resource collection
    pub collection: String,
    /// WebSocket url of the push channel
    pub push_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            push_url: DEFAULT_PUSH_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read config from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`ClientConfig::load`], but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check that both urls parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url)?;
        Url::parse(&self.push_url)?;
        Ok(())
    }

    /// `<base_url>/<collection>`
    pub fn collection_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&self.collection);
        Ok(url)
    }

    /// `<base_url>/<collection>/<id>`
    pub fn item_url(&self, id: &str) -> Result<Url, url::ParseError> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(id);
        Ok(url)
    }

    pub fn push_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.push_url)
    }
}
