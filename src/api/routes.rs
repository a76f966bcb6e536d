//! Router configuration for the API.
//!
//! Routes are collected through [`OpenApiRouter`] so the served OpenAPI
//! document always matches what is mounted.

use axum::{Json, Router, middleware, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    auth_middleware, global_error_handler, logging_middleware, rate_limit_middleware,
    request_id_middleware,
};
use crate::state::AppState;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Creates the application router.
///
/// # Middleware Order
/// Layers run in reverse order of declaration (last added runs first):
/// 1. Request ID: generates or propagates `x-request-id`
/// 2. Logging: one span per request carrying the request ID
/// 3. Error handler: renders errors as `ErrorResponse` JSON
///
/// Routes under `/api` additionally require the admin bearer token, and
/// `/api/menu` is rate limited per client address after authentication.
///
/// # Routes
/// - `/webhook` - provider handshake and inbound notifications
/// - `/health`, `/health/ready`, `/health/live`
/// - `/api/menu`, `/api/events`, `/api/statistics`, `/api/daily-averages`
/// - `/api/admin/events`, `/api/admin/events/preview`
pub fn create_router(state: AppState) -> Router {
    let menu = handlers::menu::menu_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let protected = OpenApiRouter::new()
        .merge(handlers::events::event_routes())
        .nest("/admin", handlers::admin::admin_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::health::health_routes())
        .merge(handlers::webhook::webhook_routes())
        .nest("/api", OpenApiRouter::new().merge(menu).merge(protected))
        .split_for_parts();

    router
        .route(
            OPENAPI_PATH,
            get(move || {
                let doc = openapi.clone();
                async move { Json(doc) }
            }),
        )
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::config::Settings;
    use crate::config::settings::tests::valid_settings;
    use crate::services::testing::FakeGateway;
    use crate::services::{EventRecorder, MemoryEventRecorder, Services};

    const TOKEN: &str = "admin-token-0123456789";

    fn app_with(settings: Settings) -> (Router, Arc<FakeGateway>, Arc<MemoryEventRecorder>) {
        let gateway = Arc::new(FakeGateway::new());
        let recorder = Arc::new(MemoryEventRecorder::new());
        let services = Services::new(&settings, gateway.clone(), recorder.clone()).unwrap();
        let state = AppState::new(services, None, Arc::new(settings));
        (create_router(state), gateway, recorder)
    }

    fn app() -> Router {
        app_with(valid_settings()).0
    }

    fn authed(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
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
    async fn test_api_requires_token() {
        let response = app()
            .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_json(response).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = app()
            .oneshot(Request::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_webhook_handshake_echoes_challenge() {
        let uri = "/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=4242";
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"4242");
    }

    #[tokio::test]
    async fn test_webhook_handshake_rejects_wrong_token() {
        let uri = "/webhook?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=4242";
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_webhook_handshake_requires_exact_configured_token() {
        let prefix = "/webhook?hub.mode=subscribe&hub.verify_token=verify-m&hub.challenge=1";
        let response = app()
            .oneshot(Request::get(prefix).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let mut settings = valid_settings();
        settings.whatsapp.verify_token = String::new();
        let (app, _, _) = app_with(settings);
        let empty = "/webhook?hub.mode=subscribe&hub.verify_token=&hub.challenge=1";
        let response = app
            .oneshot(Request::get(empty).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_webhook_post_without_signature_is_rejected() {
        let mut settings = valid_settings();
        settings.whatsapp.app_secret = Some("app-secret".to_string());
        let (app, _, _) = app_with(settings);

        let response = app
            .oneshot(
                Request::post("/webhook")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"object":"whatsapp_business_account"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_webhook_post_acknowledges_and_records() {
        let settings = valid_settings();
        let gateway = Arc::new(FakeGateway::new());
        let recorder = Arc::new(MemoryEventRecorder::new());
        let services = Services::new(&settings, gateway.clone(), recorder.clone()).unwrap();
        let background = services.background.clone();
        let app = create_router(AppState::new(services, None, Arc::new(settings)));

        let body = serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{ "changes": [{ "value": { "messages": [{
                "from": "37120000000",
                "id": "wamid.in",
                "type": "interactive",
                "interactive": {
                    "type": "list_reply",
                    "list_reply": { "id": "bp_140", "title": "140" }
                }
            }]}}]}]
        });
        let response = app
            .oneshot(
                Request::post("/webhook")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        background.drain().await;
        assert_eq!(recorder.count().await.unwrap(), 1);
        assert_eq!(gateway.texts_to("37120000001").len(), 1);
    }

    #[tokio::test]
    async fn test_events_listing_with_token() {
        let response = app().oneshot(authed("GET", "/api/events")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_events_limit_is_validated() {
        let response = app()
            .oneshot(authed("GET", "/api/events?limit=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_are_nested_and_protected() {
        let app = app();
        let unauthenticated = app
            .clone()
            .oneshot(
                Request::get("/api/admin/events/preview?from=2024-03-01&to=2024-03-31")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(authed(
                "GET",
                "/api/admin/events/preview?from=2024-03-01&to=2024-03-31",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["count"], 0);
    }

    #[tokio::test]
    async fn test_menu_is_rate_limited() {
        let mut settings = valid_settings();
        settings.rate_limit.max_requests = 1;
        let (app, gateway, _) = app_with(settings);

        let first = app.clone().oneshot(authed("POST", "/api/menu")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(authed("POST", "/api/menu")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(gateway.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let response = app()
            .oneshot(Request::get(OPENAPI_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let doc = body_json(response).await;
        assert!(doc["paths"]["/webhook"].is_object());
        assert!(doc["paths"]["/api/menu"].is_object());
        assert!(doc["paths"]["/api/admin/events"].is_object());
    }
}
