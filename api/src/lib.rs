use std::{env, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use colored::Colorize;
use tokio::signal;

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{health_route::health, kb::reload_route::reload_kb, triage::triage_route::triage},
};

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8000";

/// Builds the HTTP routes over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/triage", post(triage))
        .route("/health", get(health))
        .route("/kb/reload", post(reload_kb))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Loads state from the environment and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    let kb_records = state.kb().len()?;
    let model_mode = state.triage.gateway().mode_name();
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;

    println!(
        "{} listening on {} (kb records: {}, model: {})",
        "ticket-triage".green().bold(),
        host_url.cyan(),
        kb_records,
        if model_mode == "live" {
            model_mode.green()
        } else {
            model_mode.yellow()
        }
    );

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::PathBuf};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use kb_index::{KbStore, KnownIssueRecord};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use triage_core::{CallOptions, ModelGateway, TriageService};

    use super::*;

    fn state_with(kb_path: PathBuf) -> Arc<AppState> {
        let kb = Arc::new(KbStore::new());
        kb.load(vec![KnownIssueRecord {
            id: "A".into(),
            title: "Checkout fails on mobile".into(),
            symptoms: vec!["500".into(), "mobile".into()],
            content: "Payment service returns error 500.".into(),
        }])
        .unwrap();
        let svc = TriageService::new(
            kb,
            ModelGateway::degraded("no key"),
            3,
            CallOptions {
                max_output_tokens: 600,
                temperature: 0.0,
                retries: 0,
            },
        );
        Arc::new(AppState::new(svc, kb_path))
    }

    fn state() -> Arc<AppState> {
        state_with(PathBuf::from("does/not/exist.json"))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn triage_returns_result_with_kb_hits() {
        let res = router(state())
            .oneshot(post_json("/triage", r#"{"description":"Checkout error 500 on mobile"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
        let v = body_json(res).await;
        assert_eq!(v["category"], "Bug");
        assert_eq!(v["severity"], "High");
        assert_eq!(v["known_issue"], true);
        assert_eq!(v["kb_hits"][0]["id"], "A");
        assert!(v["kb_hits"][0]["match_score"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn blank_description_is_bad_request() {
        let res = router(state())
            .oneshot(post_json("/triage", r#"{"description":"   "}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res).await,
            json!({"error": "BAD_REQUEST", "message": "description is required"})
        );
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let res = router(state())
            .oneshot(post_json("/triage", r#"{"description": "#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let mut req = post_json("/triage", r#"{"description":"slow"}"#);
        req.headers_mut().insert("x-request-id", "abc".parse().unwrap());
        let res = router(state()).oneshot(req).await.unwrap();
        assert_eq!(res.headers()["x-request-id"], "abc");
    }

    #[tokio::test]
    async fn health_reports_kb_and_model_mode() {
        let res = router(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            body_json(res).await,
            json!({"success": true, "data": {"status": "ok", "kb_records": 1, "model_mode": "degraded"}})
        );
    }

    #[tokio::test]
    async fn reload_swaps_snapshot() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"[{{"id":"X","title":"Export","symptoms":[],"content":""}},{{"id":"Y"}}]"#).unwrap();
        let st = state_with(f.path().to_path_buf());

        let res = router(st.clone())
            .oneshot(Request::post("/kb/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["data"]["records"], 2);
        assert_eq!(st.kb().len().unwrap(), 2);
    }

    #[tokio::test]
    async fn bad_kb_file_keeps_old_snapshot() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        let st = state_with(f.path().to_path_buf());

        let res = router(st.clone())
            .oneshot(Request::post("/kb/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(res).await["error"], "KB_ERROR");
        assert_eq!(st.kb().snapshot().unwrap().records()[0].id, "A");
    }

    #[tokio::test]
    async fn reload_with_missing_file_keeps_snapshot() {
        let res = router(state())
            .oneshot(Request::post("/kb/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = body_json(res).await;
        assert_eq!(v["data"], json!({"reloaded": false, "records": 1}));
    }
}
