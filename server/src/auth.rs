//! Caller identity from the external identity provider.
//!
//! The provider signs an HS256 token whose `sub` claim is the member's
//! `user_id`. Sign-in flows live with the provider; this module only checks
//! the token and, for admin routes, the caller's stored role.

use std::convert::Infallible;

use alliance_hub_shared::Member;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::state::AppState;
use crate::store;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
}

#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) if !data.claims.sub.trim().is_empty() => Some(data.claims),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "rejected identity token");
                None
            }
        }
    }
}

/// Signed-in caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
    pub display_name: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn identify(parts: &Parts, state: &AppState) -> Option<CurrentUser> {
    let verifier = state.identity.as_ref()?;
    let claims = verifier.verify(bearer_token(parts)?)?;
    Some(CurrentUser {
        user_id: claims.sub,
        display_name: claims.name,
    })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        identify(parts, state).ok_or_else(|| {
            state.observability.record_auth_rejection();
            StatusCode::UNAUTHORIZED
        })
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(identify(parts, state))
    }
}

/// Loads the caller's row and checks it holds R4.
pub(crate) async fn require_event_admin(
    state: &AppState,
    pool: &sqlx::PgPool,
    user: &CurrentUser,
) -> Result<Member, StatusCode> {
    let member = store::fetch_member(pool, &user.user_id)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user.user_id, "failed to load caller for role check");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match member {
        Some(member) if member.role.is_event_admin() => Ok(member),
        _ => {
            state.observability.record_auth_rejection();
            Err(StatusCode::FORBIDDEN)
        }
    }
}
