use alliance_hub_shared::{HubView, ProfileUpdate, RegistrationUpdate, Settings};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::{CurrentUser, require_event_admin};
use crate::state::AppState;
use crate::store;

pub async fn get_hub(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
) -> Result<Json<HubView>, StatusCode> {
    state.observability.record_hub_request();
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(load_hub(pool, caller.as_ref()).await))
}

/// Leaderboards and counts degrade to empty when the member list can't be read.
pub(crate) async fn load_hub(pool: &PgPool, caller: Option<&CurrentUser>) -> HubView {
    let members = match store::fetch_members(pool).await {
        Ok(members) => members,
        Err(e) => {
            warn!(error = %e, "failed to load members for hub");
            Vec::new()
        }
    };
    let settings = store::settings_or_closed(pool).await;
    HubView::build(members, settings, caller.map(|c| c.user_id.as_str()))
}

pub async fn put_registration(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(update): Json<RegistrationUpdate>,
) -> Result<Json<Settings>, StatusCode> {
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    require_event_admin(&state, pool, &user).await?;

    let updated =
        store::update_registration(pool, update.registration_open, update.expected_version)
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to update registration window");
                state.observability.record_write_failure();
                StatusCode::INTERNAL_SERVER_ERROR
            })?;

    let Some(settings) = updated else {
        state.observability.record_version_conflict();
        return Err(StatusCode::CONFLICT);
    };

    state.observability.record_registration_toggle();
    info!(
        registration_open = settings.registration_open,
        version = settings.version,
        by = %user.user_id,
        "Registration window updated"
    );
    Ok(Json(settings))
}

/// Saves the caller's own profile and answers with the re-read hub.
pub async fn put_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<HubView>, StatusCode> {
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let saved = store::upsert_profile(pool, &user.user_id, &update)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user.user_id, "failed to save profile");
            state.observability.record_write_failure();
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if saved.is_none() {
        state.observability.record_version_conflict();
        return Err(StatusCode::CONFLICT);
    }

    state.observability.record_profile_write();
    Ok(Json(load_hub(pool, Some(&user)).await))
}
