use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc, watch,
};
use tokio_stream::wrappers::ReceiverStream;

use crate::{dto::sse::ServerEvent, state::SharedState};

/// Subscribe to the overlay SSE stream.
pub fn subscribe_overlay(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.overlay_sse().subscribe()
}

/// Convert a broadcast receiver into an SSE response, forwarding events until the client
/// disconnects.
///
/// `greeting` is delivered first so a fresh overlay can draw immediately instead of
/// waiting for the next change. The stream ends once `shutdown` turns true, so graceful
/// shutdown is not held open by connected overlays.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    greeting: Option<ServerEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(payload) = greeting {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = async { let _ = shutdown.wait_for(|quit| *quit).await; } => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        // A slow overlay only misses intermediate frames.
                        Err(RecvError::Lagged(_)) => continue,
                    }
                }
            }
        }

        tracing::info!("overlay SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SseHub;

    #[tokio::test]
    async fn stream_ends_on_shutdown() {
        use axum::response::IntoResponse;
        use futures::StreamExt;

        let hub = SseHub::new(4);
        let (quit_tx, quit_rx) = watch::channel(false);
        let greeting = ServerEvent::new(Some("info".into()), "hello".into());
        let response = to_sse_stream(hub.subscribe(), Some(greeting), quit_rx).into_response();
        let mut body = response.into_body().into_data_stream();

        let first = body.next().await.unwrap().unwrap();
        assert!(String::from_utf8_lossy(&first).contains("hello"));

        quit_tx.send_replace(true);
        let rest = tokio::time::timeout(Duration::from_secs(1), async {
            while let Some(chunk) = body.next().await {
                chunk.unwrap();
            }
        })
        .await;
        assert!(rest.is_ok(), "stream kept running after shutdown");
    }

    #[tokio::test]
    async fn hub_delivers_to_every_subscriber() {
        let hub = SseHub::new(4);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        hub.broadcast(ServerEvent::new(Some("info".into()), "hello".into()));

        assert_eq!(first.recv().await.unwrap().data, "hello");
        let event = second.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("info"));
    }
}
