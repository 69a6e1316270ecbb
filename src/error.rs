//! Error Types
//!
//! Failures surfaced by the transport, the push stream and config loading.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// REST call failure
///
/// Recorded by the store in `fetching_error` / `saving_error`.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("item has no id")]
    MissingId,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Push channel failure
///
/// Never returned to consumers; the stream logs it and carries on (or ends).
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("connection failed: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("connection error: {0}")]
    Transport(#[source] tungstenite::Error),

    #[error("undecodable message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("pushed item has no id")]
    MissingId,
}

/// Config file failure
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid url in config: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
