use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::overlay::LeaderboardEntryDto;

/// Response payload listing the top of the leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntryDto>,
}
