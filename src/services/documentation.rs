use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for WordTwitch Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::overlay_stream,
        crate::routes::public::get_round,
        crate::routes::public::get_leaderboard,
        crate::routes::admin::start_round,
        crate::routes::admin::stop_round,
        crate::routes::admin::quit,
        crate::routes::admin::inject_chat,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::overlay::OverlaySnapshot,
            crate::dto::overlay::PuzzleDto,
            crate::dto::overlay::VisibleRoundPhase,
            crate::dto::overlay::LeaderboardEntryDto,
            crate::dto::public::LeaderboardResponse,
            crate::dto::admin::ChatInjectionRequest,
            crate::dto::admin::ChatInjectionResponse,
            crate::dto::admin::ActionResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "public", description = "Read-only round state"),
        (name = "admin", description = "Presenter controls"),
    )
)]
pub struct ApiDoc;
