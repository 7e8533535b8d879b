use alliance_hub_shared::{AdminBoard, AssignmentRequest};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::{CurrentUser, require_event_admin};
use crate::state::AppState;
use crate::store;

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    /// Sort by stated intent, then deployable power, for display only.
    #[serde(default)]
    pub priority: bool,
}

async fn load_board(pool: &PgPool, priority_sorted: bool) -> Result<AdminBoard, StatusCode> {
    let members = store::fetch_members(pool).await.map_err(|e| {
        warn!(error = %e, "failed to load members for admin board");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(AdminBoard::build(members, priority_sorted))
}

pub async fn get_board(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<BoardQuery>,
) -> Result<Json<AdminBoard>, StatusCode> {
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    require_event_admin(&state, pool, &user).await?;
    Ok(Json(load_board(pool, query.priority).await?))
}

/// Assigns every selected member in one write, then answers with the refreshed
/// board in its default order.
pub async fn post_assignments(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<AssignmentRequest>,
) -> Result<Json<AdminBoard>, StatusCode> {
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    require_event_admin(&state, pool, &user).await?;

    if !request.user_ids.is_empty() {
        let changed = store::assign_team(pool, &request.user_ids, request.team)
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to assign team");
                state.observability.record_write_failure();
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
        state.observability.record_team_assignments(changed);
        info!(
            team = request.team.as_str(),
            selected = request.user_ids.len(),
            changed,
            by = %user.user_id,
            "Team assignment applied"
        );
    }

    Ok(Json(load_board(pool, false).await?))
}
