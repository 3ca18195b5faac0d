use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    services::{round_service, sse_events, sse_service},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/overlay",
    tag = "sse",
    responses((status = 200, description = "Overlay SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream overlay frames, starting with the current one.
pub async fn overlay_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_overlay(&state);
    info!(
        subscribers = state.overlay_sse().subscriber_count(),
        "New overlay SSE connection"
    );
    sse_events::broadcast_info(&state, "overlay connected");
    let greeting = sse_events::round_snapshot_event(round_service::snapshot(&state).await);
    sse_service::to_sse_stream(receiver, greeting, state.shutdown_watcher())
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/overlay", get(overlay_stream))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        time::timeout,
    };

    use crate::{routes, services::test_support::pool_state};

    #[tokio::test]
    async fn connected_overlay_does_not_block_graceful_shutdown() {
        let (state, _outbox, _store) = pool_state();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut quit = state.shutdown_watcher();
        let app = routes::router(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = quit.wait_for(|requested| *requested).await;
                })
                .await
        });

        let mut overlay = TcpStream::connect(addr).await.unwrap();
        overlay
            .write_all(b"GET /sse/overlay HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        while !String::from_utf8_lossy(&received).contains("round.snapshot") {
            let read = timeout(Duration::from_secs(2), overlay.read(&mut buf))
                .await
                .unwrap()
                .unwrap();
            assert!(read > 0, "overlay connection closed early");
            received.extend_from_slice(&buf[..read]);
        }
        assert!(String::from_utf8_lossy(&received).starts_with("HTTP/1.1 200 OK"));

        state.request_shutdown();
        let finished = timeout(Duration::from_secs(3), server).await;
        assert!(finished.is_ok(), "server kept running with an overlay connected");
        finished.unwrap().unwrap().unwrap();
    }
}
