use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::{overlay::OverlaySnapshot, public::LeaderboardResponse},
    services::round_service,
    state::SharedState,
};

/// Public read-only endpoints that expose the current round.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/round", get(get_round))
        .route("/public/leaderboard", get(get_leaderboard))
}

#[utoipa::path(
    get,
    path = "/public/round",
    tag = "public",
    responses((status = 200, description = "Current overlay frame", body = OverlaySnapshot))
)]
/// Return the frame an overlay would currently draw.
pub async fn get_round(State(state): State<SharedState>) -> Json<OverlaySnapshot> {
    Json(round_service::snapshot(&state).await.into())
}

#[utoipa::path(
    get,
    path = "/public/leaderboard",
    tag = "public",
    responses((status = 200, description = "Top of the leaderboard", body = LeaderboardResponse))
)]
/// Return the top five players.
pub async fn get_leaderboard(State(state): State<SharedState>) -> Json<LeaderboardResponse> {
    Json(round_service::leaderboard(&state).await)
}
