//! Cancellable push-event subscription
//!
//! A producer (the socket reader, or a test double) holds an [`EventSink`];
//! the consumer reads an [`EventStream`]. Closing through a [`CloseHandle`]
//! stops delivery at both ends, including events already queued.

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::models::ItemEvent;

/// Create a connected sink/stream pair
pub fn event_channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let token = CancellationToken::new();
    (
        EventSink {
            tx,
            token: token.clone(),
        },
        EventStream { events: rx, token },
    )
}

/// Producer side of a subscription
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ItemEvent>,
    token: CancellationToken,
}

impl EventSink {
    /// Hand an event to the consumer
    ///
    /// Returns `false` once the subscription is closed or the stream dropped;
    /// the producer should stop reading at that point.
    pub fn deliver(&self, event: ItemEvent) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.tx.is_closed()
    }

    /// Resolves when the subscription is closed
    pub async fn closed(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = self.tx.closed() => {}
        }
    }
}

/// Consumer side of a subscription: a lazy sequence of decoded events
pub struct EventStream {
    events: mpsc::UnboundedReceiver<ItemEvent>,
    token: CancellationToken,
}

impl EventStream {
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            token: self.token.clone(),
        }
    }

    /// Next event, or `None` once the subscription is closed or the
    /// producer has gone away
    pub async fn next_event(&mut self) -> Option<ItemEvent> {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            event = self.events.recv() => event.filter(|_| !self.token.is_cancelled()),
        }
    }

    /// Adapt into a `futures::Stream`
    pub fn into_stream(self) -> impl Stream<Item = ItemEvent> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            let event = stream.next_event().await?;
            Some((event, stream))
        })
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Terminates a subscription
#[derive(Clone, Debug)]
pub struct CloseHandle {
    token: CancellationToken,
}

impl CloseHandle {
    pub fn close(&self) {
        if !self.token.is_cancelled() {
            log::info!("event stream - closing");
        }
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, Item};
    use futures::StreamExt;

    fn created(id: &str) -> ItemEvent {
        ItemEvent::new(EventKind::Created, Item::with_id(id, "x"))
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sink, mut stream) = event_channel();
        assert!(sink.deliver(created("1")));
        assert!(sink.deliver(created("2")));

        assert_eq!(stream.next_event().await, Some(created("1")));
        assert_eq!(stream.next_event().await, Some(created("2")));
    }

    #[tokio::test]
    async fn test_close_suppresses_queued_events() {
        let (sink, mut stream) = event_channel();
        let handle = stream.close_handle();
        assert!(sink.deliver(created("1")));
        assert!(!handle.is_closed());

        handle.close();
        assert!(handle.is_closed());

        assert_eq!(stream.next_event().await, None);
        assert!(!sink.deliver(created("2")));
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn test_close_wakes_a_waiting_consumer() {
        let (_sink, mut stream) = event_channel();
        let handle = stream.close_handle();

        let waiter = tokio::spawn(async move { stream.next_event().await });
        tokio::task::yield_now().await;
        handle.close();

        assert_eq!(waiter.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stream_ends_when_producer_drops() {
        let (sink, stream) = event_channel();
        sink.deliver(created("1"));
        drop(sink);

        let events: Vec<_> = stream.into_stream().collect().await;
        assert_eq!(events, vec![created("1")]);
    }

    #[tokio::test]
    async fn test_dropping_stream_closes_sink() {
        let (sink, stream) = event_channel();
        drop(stream);
        sink.closed().await;
        assert!(!sink.deliver(created("1")));
    }
}
