use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::admin::{ActionResponse, ChatInjectionRequest, ChatInjectionResponse},
    error::AppError,
    services::{chat_service, round_service},
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Presenter controls: force-start, stop, quit and local chat injection.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/round/start", post(start_round))
        .route("/admin/round/stop", post(stop_round))
        .route("/admin/quit", post(quit))
        .route("/admin/chat", post(inject_chat))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Start a new round, replacing the current one.
#[utoipa::path(
    post,
    path = "/admin/round/start",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Required when an admin token is configured")),
    responses((status = 200, description = "Round started", body = ActionResponse))
)]
pub async fn start_round(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    let round_id = round_service::start_round(&state).await?;
    Ok(Json(ActionResponse {
        message: format!("round {round_id} started"),
    }))
}

/// Stop the running round.
#[utoipa::path(
    post,
    path = "/admin/round/stop",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Required when an admin token is configured")),
    responses(
        (status = 200, description = "Round stopped", body = ActionResponse),
        (status = 409, description = "No round is running")
    )
)]
pub async fn stop_round(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    round_service::stop_round(&state).await?;
    Ok(Json(ActionResponse {
        message: "round stopped".into(),
    }))
}

/// Shut the server down gracefully.
#[utoipa::path(
    post,
    path = "/admin/quit",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Required when an admin token is configured")),
    responses((status = 200, description = "Shutdown requested", body = ActionResponse))
)]
pub async fn quit(State(state): State<SharedState>) -> Json<ActionResponse> {
    round_service::quit(&state);
    Json(ActionResponse {
        message: "shutting down".into(),
    })
}

/// Feed a chat message through the same path as messages read from the channel.
#[utoipa::path(
    post,
    path = "/admin/chat",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Required when an admin token is configured")),
    request_body = ChatInjectionRequest,
    responses(
        (status = 200, description = "Message handled", body = ChatInjectionResponse),
        (status = 400, description = "Invalid message")
    )
)]
pub async fn inject_chat(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ChatInjectionRequest>>,
) -> Json<ChatInjectionResponse> {
    let reply = chat_service::handle_chat_event(&state, payload.into()).await;
    Json(ChatInjectionResponse { reply })
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.admin_token() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if provided == expected {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin token".into()))
    }
}
