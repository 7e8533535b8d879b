use alliance_hub_shared::RosterSection;
use alliance_hub_shared::roster::group_by_role;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::state::AppState;
use crate::store;

pub async fn get_roster(
    State(state): State<AppState>,
) -> Result<Json<Vec<RosterSection>>, StatusCode> {
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let members = match store::fetch_members(pool).await {
        Ok(members) => members,
        Err(e) => {
            warn!(error = %e, "failed to load roster");
            Vec::new()
        }
    };
    Ok(Json(group_by_role(members)))
}
