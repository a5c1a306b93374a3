use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::{require_auth, require_csrf};
use crate::core::ServerState;
use crate::middleware::logging_middleware;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(api::health::router())
        // Auth API - CSRF exempt
        .merge(api::auth::router())
        // Catalog API - reads public, writes admin + CSRF
        .merge(api::products::router())
        .merge(api::categories::router())
        // Newsletter API - public signup
        .merge(api::newsletter::router())
}

/// Build a fully configured application with all middleware and state
///
/// Layers run outermost-last: request ID → CORS → compression → trace →
/// request logging → CSRF → authentication → handler.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Application Middleware ==========
        // Authentication - injects CurrentUser for protected routes
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        // CSRF double-submit check for mutating requests
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_csrf,
        ))
        // Request logging
        .layer(axum_middleware::from_fn(logging_middleware))
        // ========== Tower HTTP Middleware ==========
        // Timeout - abort handlers that run too long
        .layer(TimeoutLayer::new(Duration::from_millis(
            state.config.request_timeout_ms,
        )))
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::db::DbService;
    use axum::body::Body;
    use http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    async fn test_state() -> ServerState {
        let db = DbService::in_memory().await.unwrap();
        ServerState::new(Config::with_overrides("/tmp", 0), db)
    }

    async fn test_app() -> Router {
        let state = test_state().await;
        build_app(&state).with_state(state)
    }

    fn admin_get(state: &ServerState, uri: &str) -> Request<Body> {
        let token = state.jwt_service.generate_token(1, "curator", "admin").unwrap();
        Request::get(uri)
            .header(http::header::COOKIE, format!("authToken={token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = body_json(response).await;
        assert_eq!(body["database"], "ok");
    }

    #[tokio::test]
    async fn test_mutation_without_csrf_is_forbidden() {
        let app = test_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/products")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.extensions().get::<crate::auth::CsrfRejection>(),
            Some(&crate::auth::CsrfRejection("missing"))
        );
        assert_eq!(
            response.extensions().get::<crate::utils::ErrorCode>(),
            Some(&crate::utils::ErrorCode::CsrfTokenMissing)
        );
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("CSRF"));
    }

    #[tokio::test]
    async fn test_admin_list_requires_auth() {
        let app = test_app().await;
        let response = app
            .oneshot(
                Request::get("/api/products/admin/all")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Unauthorized: authentication required");
    }

    #[tokio::test]
    async fn test_public_catalog_reads() {
        let app = test_app().await;
        let response = app
            .clone()
            .oneshot(Request::get("/api/products").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([]));

        let response = app
            .oneshot(Request::get("/api/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_csrf_token_sets_cookie() {
        let app = test_app().await;
        let response = app
            .oneshot(
                Request::get("/api/auth/csrf-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(http::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("csrfToken="));

        let body = body_json(response).await;
        let token = body["data"]["csrfToken"].as_str().unwrap();
        assert!(cookie.contains(token));
    }

    #[tokio::test]
    async fn test_admin_list_accepts_blank_filters() {
        let state = test_state().await;
        let app = build_app(&state).with_state(state.clone());
        let response = app
            .oneshot(admin_get(
                &state,
                "/api/products/admin/all?search=&category=&status=&page=1&limit=20",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([]));
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["limit"], 20);
    }

    #[tokio::test]
    async fn test_malformed_query_uses_failure_envelope() {
        let state = test_state().await;
        let app = build_app(&state).with_state(state.clone());
        let response = app
            .oneshot(admin_get(&state, "/api/products/admin/all?category=rings"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "InvalidRequest");
        assert!(body["message"].as_str().unwrap().contains("category"));
    }

    #[tokio::test]
    async fn test_malformed_path_uses_failure_envelope() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::get("/api/products/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "InvalidRequest");
    }
}
