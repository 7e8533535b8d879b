use alliance_hub_shared::{Member, SignupRequest, SignupScreen};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::auth::CurrentUser;
use crate::state::AppState;
use crate::store;

pub async fn get_signup(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
) -> Result<Json<SignupScreen>, StatusCode> {
    let Some(caller) = caller else {
        return Ok(Json(SignupScreen::Unauthenticated));
    };
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let settings = store::settings_or_closed(pool).await;
    let member = match store::fetch_member(pool, &caller.user_id).await {
        Ok(member) => member,
        Err(e) => {
            warn!(error = %e, user_id = %caller.user_id, "failed to load signup member");
            None
        }
    };

    Ok(Json(SignupScreen::resolve(true, &settings, member.as_ref())))
}

/// Records the caller's attendance while the registration window is open.
pub async fn post_signup(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SignupRequest>,
) -> Result<Json<Member>, StatusCode> {
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let settings = store::fetch_settings(pool).await.map_err(|e| {
        warn!(error = %e, "failed to load settings before signup");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if !settings.registration_open {
        return Err(StatusCode::FORBIDDEN);
    }

    let submission = request.into_submission().map_err(|e| {
        debug!(error = %e, user_id = %user.user_id, "rejected signup form");
        StatusCode::UNPROCESSABLE_ENTITY
    })?;

    let member = store::upsert_signup(
        pool,
        &user.user_id,
        user.display_name.as_deref(),
        submission,
        Utc::now(),
    )
    .await
    .map_err(|e| {
        warn!(error = %e, user_id = %user.user_id, "failed to save signup");
        state.observability.record_write_failure();
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    state.observability.record_signup_write();
    info!(
        user_id = %member.user_id,
        attendance = submission.attendance.label(),
        "Desert Storm signup recorded"
    );
    Ok(Json(member))
}
