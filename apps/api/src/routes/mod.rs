pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ai::handlers as ai;
use crate::calendar::handlers as calendar;
use crate::clients::handlers as clients;
use crate::dashboard::handlers as dashboard;
use crate::deals::handlers as deals;
use crate::insights::handlers as insights;
use crate::notifications::handlers as notifications;
use crate::search::handlers as search;
use crate::state::AppState;
use crate::uploads::handlers as uploads;

/// Room for a batch of files at the per-file cap plus multipart framing.
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Records
        .route(
            "/api/deals",
            get(deals::handle_list_deals).post(deals::handle_create_deal),
        )
        .route(
            "/api/deals/:id",
            get(deals::handle_get_deal)
                .put(deals::handle_update_deal)
                .delete(deals::handle_delete_deal),
        )
        .route(
            "/api/clients",
            get(clients::handle_list_clients).post(clients::handle_create_client),
        )
        .route(
            "/api/clients/:id",
            get(clients::handle_get_client)
                .put(clients::handle_update_client)
                .delete(clients::handle_delete_client),
        )
        .route(
            "/api/insights",
            get(insights::handle_list_insights).post(insights::handle_create_insight),
        )
        .route(
            "/api/notifications",
            get(notifications::handle_list_notifications)
                .post(notifications::handle_create_notification)
                .patch(notifications::handle_bulk_notifications),
        )
        .route(
            "/api/notifications/stream",
            get(notifications::handle_notification_stream),
        )
        .route(
            "/api/calendar/events",
            get(calendar::handle_list_events)
                .post(calendar::handle_create_event)
                .patch(calendar::handle_update_event)
                .delete(calendar::handle_delete_event),
        )
        // Aggregates
        .route("/api/dashboard/stats", get(dashboard::handle_dashboard_stats))
        .route("/api/search", get(search::handle_search))
        .route(
            "/api/upload",
            post(uploads::handle_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // AI
        .route("/api/ai/chat", post(ai::handle_chat))
        .route("/api/ai/analyze", post(ai::handle_analyze))
        .route("/api/ai/predict", post(ai::handle_predict))
        .route("/api/ai/negotiation", post(ai::handle_negotiation))
        .route("/api/ai/risk-management", post(ai::handle_risk_management))
        .route(
            "/api/ai/market-intelligence",
            post(ai::handle_market_intelligence),
        )
        .route("/api/ai/reports", post(ai::handle_reports))
        .route("/api/ai/visualization", post(ai::handle_visualization))
        .route("/api/ai/collaboration", post(ai::handle_collaboration))
        .route("/api/ai/blockchain", post(ai::handle_blockchain))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::{ChatModel, LlmClient};

    fn offline_app(upload_dir: &str) -> Router {
        let config = Config::for_tests(upload_dir);
        let llm: Arc<dyn ChatModel> = Arc::new(LlmClient::new(&config).unwrap());
        build_router(AppState::new(config, llm))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn read_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = offline_app("uploads").oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "dealroom-api");
    }

    #[tokio::test]
    async fn test_deal_lifecycle_over_http() {
        let app = offline_app("uploads");

        let response = app.clone().oneshot(get("/api/deals")).await.unwrap();
        let body = read_json(response).await;
        assert_eq!(body["total"], 3);

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/deals",
                json!({"name": "Fintech Buyout", "company": "PayCo", "value": 12000000}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = read_json(response).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get(&format!("/api/deals/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(get("/api/deals")).await.unwrap();
        assert_eq!(read_json(response).await["total"], 4);
    }

    #[tokio::test]
    async fn test_missing_deal_is_404_envelope() {
        let response = offline_app("uploads")
            .oneshot(get("/api/deals/nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Deal not found");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400_envelope() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/deals")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = offline_app("uploads").oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_created_notification_is_listed() {
        let app = offline_app("uploads");
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/notifications",
                json!({"type": "info", "title": "Stage changed", "userId": "u1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(get("/api/notifications?userId=u1"))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["data"]["notifications"][0]["title"], "Stage changed");
        assert_eq!(body["data"]["unreadCount"], 1);
    }

    #[tokio::test]
    async fn test_search_rejects_short_query() {
        let response = offline_app("uploads")
            .oneshot(get("/api/search?q=a"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let response = offline_app("uploads")
            .oneshot(get("/api/dashboard/stats"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["metadata"]["period"], "30d");
    }

    #[tokio::test]
    async fn test_ai_routes_require_input() {
        let cases = [
            ("/api/ai/chat", "Message is required"),
            ("/api/ai/analyze", "Document content is required"),
            ("/api/ai/predict", "Deal data is required"),
            ("/api/ai/negotiation", "Negotiation type and deal data are required"),
            ("/api/ai/risk-management", "Deal data is required"),
            ("/api/ai/market-intelligence", "Sector is required"),
            ("/api/ai/reports", "Report type and deal data are required"),
            ("/api/ai/visualization", "Visualization type and deal data are required"),
            ("/api/ai/collaboration", "Collaboration type and team data are required"),
            ("/api/ai/blockchain", "Blockchain type and deal data are required"),
        ];
        let app = offline_app("uploads");
        for (uri, message) in cases {
            let response = app
                .clone()
                .oneshot(json_request(Method::POST, uri, json!({})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(read_json(response).await["error"], message, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_ai_fallback_is_200() {
        let response = offline_app("uploads")
            .oneshot(json_request(
                Method::POST,
                "/api/ai/predict",
                json!({"dealData": {"deal_size": 5}, "marketContext": {"market_trend": "positive"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["prediction"]["success_probability"], 85);
        assert_eq!(body["prediction"]["metadata"]["model_used"], "demo-fallback");
    }

    #[tokio::test]
    async fn test_every_ai_route_serves_demo_content_without_key() {
        let deal = json!({"id": "1", "value": 75000000, "deal_size": 5});
        let cases = [
            ("/api/ai/chat", json!({"message": "How do I value a target?"}), "/metadata/model"),
            (
                "/api/ai/analyze",
                json!({"content": "Revenue grew 12% to $4M", "documentType": "financial"}),
                "/analysis/metadata/model_used",
            ),
            ("/api/ai/predict", json!({"dealData": deal}), "/prediction/metadata/model_used"),
            (
                "/api/ai/negotiation",
                json!({"negotiationType": "acquisition", "dealData": deal}),
                "/negotiation/metadata/model_used",
            ),
            (
                "/api/ai/risk-management",
                json!({"dealData": deal}),
                "/risk_management/metadata/model_used",
            ),
            (
                "/api/ai/market-intelligence",
                json!({"sector": "technology"}),
                "/intelligence/metadata/model_used",
            ),
            (
                "/api/ai/reports",
                json!({"reportType": "due_diligence", "dealData": deal}),
                "/report/metadata/model_used",
            ),
            (
                "/api/ai/visualization",
                json!({"visualizationType": "deal_flow", "dealData": deal}),
                "/visualization/metadata/model_used",
            ),
            (
                "/api/ai/collaboration",
                json!({"collaborationType": "virtual_team", "teamData": {"members": ["a"]}}),
                "/collaboration/metadata/model_used",
            ),
            (
                "/api/ai/blockchain",
                json!({"blockchainType": "deal_execution", "dealData": deal}),
                "/blockchain/metadata/model_used",
            ),
        ];
        let app = offline_app("uploads");
        for (uri, payload, model_pointer) in cases {
            let response = app
                .clone()
                .oneshot(json_request(Method::POST, uri, payload))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let body = read_json(response).await;
            assert_eq!(body["success"], true, "{uri}");
            assert_eq!(body.pointer(model_pointer), Some(&json!("demo-fallback")), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_chat_with_live_model() {
        let llm = Arc::new(ScriptedModel::new(&[
            "Start with a quality-of-earnings review.",
            r#"{"type": "advice", "sentiment": "neutral"}"#,
        ]));
        let app = build_router(AppState::new(Config::for_tests("uploads"), llm));
        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/ai/chat",
                json!({"message": "Where should diligence start?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["response"], "Start with a quality-of-earnings review.");
        assert_eq!(body["metadata"]["model"], "scripted");
    }

    #[tokio::test]
    async fn test_upload_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let boundary = "X-DEALROOM-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"contract.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             terms\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = offline_app(dir.path().to_str().unwrap())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["message"], "Uploaded 1 files");
        assert_eq!(body["files"][0]["documentType"], "contract");
        assert_eq!(body["files"][0]["size"], 5);
    }

    #[tokio::test]
    async fn test_upload_rejects_get() {
        let response = offline_app("uploads")
            .oneshot(get("/api/upload"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_stream_preflight_is_allowed() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/notifications/stream")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = offline_app("uploads").oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
