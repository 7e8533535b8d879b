use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::config::CORS_MAX_AGE_SECS;
use crate::routes;
use crate::state::AppState;

const NO_STORE: &str = "private, no-store";

pub(crate) fn build_app(state: AppState) -> Router {
    let app = Router::new()
        .route("/api/hub", get(routes::hub::get_hub))
        .route("/api/settings/registration", put(routes::hub::put_registration))
        .route("/api/me/profile", put(routes::hub::put_profile))
        .route("/api/desert-storm", get(routes::desert_storm::get_signup))
        .route("/api/desert-storm/signup", post(routes::desert_storm::post_signup))
        .route("/api/admin/board", get(routes::admin::get_board))
        .route("/api/admin/assignments", post(routes::admin::post_assignments))
        .route("/api/roster", get(routes::roster::get_roster))
        .route("/api/me", get(routes::api::get_me))
        .route("/api/auth/redirects", get(routes::api::get_auth_redirects))
        .route("/api/health", get(routes::api::health))
        .route("/api/metrics", get(routes::api::metrics));

    app.layer(middleware::from_fn(set_private_cache_control))
        .layer(CompressionLayer::new())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::very_permissive().max_age(Duration::from_secs(CORS_MAX_AGE_SECS))
}

/// Member data is per-caller; never let a shared cache keep it.
async fn set_private_cache_control(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    if !response.headers().contains_key(header::CACHE_CONTROL) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn api_responses_are_not_cacheable() {
        let app = build_app(AppState::new(None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/redirects")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("redirects response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static(NO_STORE))
        );
    }

    #[tokio::test]
    async fn metrics_keeps_its_own_cache_header() {
        let app = build_app(AppState::new(None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/metrics")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("metrics response");

        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
    }

    #[tokio::test]
    async fn unknown_routes_and_wrong_methods_are_rejected() {
        let app = build_app(AppState::new(None));

        let missing = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/guilds")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("missing route response");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let wrong_method = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/hub")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("wrong method response");
        assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let app = build_app(AppState::new(None));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/desert-storm/signup")
                    .header(header::ORIGIN, "https://portal.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("preflight response");

        assert!(response.status().is_success());
        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }
}
