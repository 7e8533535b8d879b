use std::fmt::Write as _;

use alliance_hub_shared::{AuthRedirects, MemberBadge};
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::warn;

use crate::auth::CurrentUser;
use crate::state::{AppState, ObservabilitySnapshot};
use crate::store;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "database_available": state.db.is_some(),
        "identity_configured": state.identity.is_some(),
        "observability": {
            "hub_requests_total": observability.hub_requests_total,
            "profile_writes_total": observability.profile_writes_total,
            "signup_writes_total": observability.signup_writes_total,
            "registration_toggles_total": observability.registration_toggles_total,
            "team_assignments_total": observability.team_assignments_total,
            "write_failures_total": observability.write_failures_total,
            "version_conflicts_total": observability.version_conflicts_total,
            "auth_rejections_total": observability.auth_rejections_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = render_prometheus_metrics(
        state.db.is_some(),
        state.identity.is_some(),
        state.observability.snapshot(),
    );

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn write_metric(body: &mut String, name: &str, kind: &str, help: &str, value: u64) {
    let _ = writeln!(body, "# HELP alliance_hub_{name} {help}");
    let _ = writeln!(body, "# TYPE alliance_hub_{name} {kind}");
    let _ = writeln!(body, "alliance_hub_{name} {value}");
}

fn render_prometheus_metrics(
    database_available: bool,
    identity_configured: bool,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    write_metric(
        &mut body,
        "database_available",
        "gauge",
        "Whether the member store is reachable (1 or 0).",
        u64::from(database_available),
    );
    write_metric(
        &mut body,
        "identity_configured",
        "gauge",
        "Whether bearer tokens can be verified (1 or 0).",
        u64::from(identity_configured),
    );

    let counters = [
        (
            "hub_requests_total",
            "Total hub page requests.",
            observability.hub_requests_total,
        ),
        (
            "profile_writes_total",
            "Total saved profile edits.",
            observability.profile_writes_total,
        ),
        (
            "signup_writes_total",
            "Total recorded Desert Storm signups.",
            observability.signup_writes_total,
        ),
        (
            "registration_toggles_total",
            "Total registration window changes.",
            observability.registration_toggles_total,
        ),
        (
            "team_assignments_total",
            "Total member rows given a team assignment.",
            observability.team_assignments_total,
        ),
        (
            "write_failures_total",
            "Total failed writes to the member store.",
            observability.write_failures_total,
        ),
        (
            "version_conflicts_total",
            "Total writes rejected for a stale version.",
            observability.version_conflicts_total,
        ),
        (
            "auth_rejections_total",
            "Total requests refused for missing identity or role.",
            observability.auth_rejections_total,
        ),
    ];
    for (name, help, value) in counters {
        write_metric(&mut body, name, "counter", help, value);
    }

    body
}

/// Name and rank for the header badge.
pub async fn get_me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MemberBadge>, StatusCode> {
    let pool = state.db.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let member = store::fetch_member(pool, &user.user_id)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user.user_id, "failed to load member badge");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    member
        .map(|m| Json(m.badge()))
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_auth_redirects() -> Json<AuthRedirects> {
    Json(AuthRedirects::default())
}
