//! Store HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the store handlers
//! - Wire up middleware (timeout, tracing)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::StoreConfig;
use crate::store::handlers;
use crate::store::ConfigStore;

/// HTTP front of a [`ConfigStore`].
pub struct StoreServer {
    router: Router,
}

impl StoreServer {
    pub fn new(config: &StoreConfig, store: Arc<ConfigStore>) -> Self {
        Self {
            router: Self::build_router(config, store),
        }
    }

    #[allow(deprecated)]
    fn build_router(config: &StoreConfig, store: Arc<ConfigStore>) -> Router {
        Router::new()
            .route(
                "/api/configs",
                get(handlers::get_configs).post(handlers::post_configs),
            )
            .route("/api/methods", get(handlers::get_methods))
            .route("/health", get(handlers::get_health))
            .with_state(store)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Router without a listener, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Config store listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Config store stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{ConfigDraft, DraftValidator, MethodRegistry, ValidationPolicy};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server() -> StoreServer {
        let registry = Arc::new(MethodRegistry::from_entries([("dt", "Decision Tree")]));
        let validator = DraftValidator::new(registry, ValidationPolicy::default());
        let store = Arc::new(ConfigStore::new(ConfigDraft::default(), validator));
        StoreServer::new(&StoreConfig::default(), store)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(body: &str) -> Request<Body> {
        Request::post("/api/configs")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn serves_current_draft_with_wire_names() {
        let response = server()
            .router()
            .oneshot(Request::get("/api/configs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["budget"], 100);
        assert_eq!(body["budget_type"], "classifier");
        assert_eq!(body["methods"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn valid_submission_is_stored() {
        let router = server().router();
        let response = router
            .clone()
            .oneshot(post(r#"{"methods": ["dt"], "budget": 12}"#))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::json!({"success": true}));

        let response = router
            .oneshot(Request::get("/api/configs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["budget"], 12);
    }

    #[tokio::test]
    async fn invalid_submission_is_declined() {
        let response = server()
            .router()
            .oneshot(post(r#"{"methods": [], "budget": 12}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"success": false}));
    }

    #[tokio::test]
    async fn undecodable_submission_is_bad_request() {
        let response = server()
            .router()
            .oneshot(post(r#"{"metric": "accuracy"}"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn lists_registered_methods() {
        let response = server()
            .router()
            .oneshot(Request::get("/api/methods").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"dt": {"fullname": "Decision Tree"}})
        );
    }
}
