/// Twitch chat transport and reconnect supervisor.
pub mod chat_bridge;
/// Chat command routing and replies.
pub mod chat_service;
/// Presenter frame loop.
pub mod display_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Round control and read-only round views.
pub mod round_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
#[cfg(test)]
pub(crate) mod test_support;
