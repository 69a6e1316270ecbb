//! WebSocket push channel
//!
//! One reader task per subscription. Text frames are decoded into
//! [`ItemEvent`]s; anything that goes wrong is logged and never returned.

use futures::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use super::stream::{event_channel, EventSink, EventStream};
use crate::error::StreamError;
use crate::models::{ItemEvent, PushMessage};

/// Decode one text frame
pub fn decode_event(text: &str) -> Result<ItemEvent, StreamError> {
    let message: PushMessage = serde_json::from_str(text)?;
    if message.payload.item.id.is_none() {
        return Err(StreamError::MissingId);
    }
    Ok(message.into())
}

/// Spawn a reader task for `url` and return its event stream
///
/// Must be called from within a tokio runtime.
pub fn open_websocket_stream(url: Url) -> EventStream {
    let (sink, stream) = event_channel();
    tokio::spawn(read_socket(url, sink));
    stream
}

async fn read_socket(url: Url, sink: EventSink) {
    log::info!("web socket - connecting to {}", url);

    let connected = tokio::select! {
        _ = sink.closed() => {
            log::info!("web socket - closed before connecting");
            return;
        }
        result = connect_async(url.as_str()) => result,
    };

    let mut socket = match connected {
        Ok((socket, _response)) => socket,
        Err(e) => {
            log::warn!("web socket onerror: {}", StreamError::Connect(e));
            return;
        }
    };
    log::info!("web socket onopen");

    loop {
        let frame = tokio::select! {
            biased;
            _ = sink.closed() => None,
            frame = socket.next() => Some(frame),
        };

        let Some(frame) = frame else {
            // Subscription closed locally
            if let Err(e) = socket.close(None).await {
                log::debug!("web socket close handshake failed: {}", e);
            }
            break;
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                log::debug!("web socket onmessage");
                match decode_event(&text) {
                    Ok(event) => {
                        if !sink.deliver(event) {
                            break;
                        }
                    }
                    Err(e) => log::warn!("web socket onerror: {}", e),
                }
            }
            Some(Ok(Message::Close(_))) | None => break,
            // Pings are answered by tungstenite itself
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                log::warn!("web socket onerror: {}", StreamError::Transport(e));
                break;
            }
        }
    }

    log::info!("web socket onclose");
}
