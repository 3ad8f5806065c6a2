use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::draft::{ConfigDraft, DraftPayload, MethodRegistry};
use crate::observability::metrics;
use crate::service::SubmitResponse;
use crate::store::ConfigStore;

#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn get_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

pub async fn get_configs(State(store): State<Arc<ConfigStore>>) -> Json<ConfigDraft> {
    Json(store.current().as_ref().clone())
}

pub async fn get_methods(State(store): State<Arc<ConfigStore>>) -> Json<MethodRegistry> {
    Json(store.registry().clone())
}

pub async fn post_configs(
    State(store): State<Arc<ConfigStore>>,
    payload: Result<Json<DraftPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Undecodable submission");
            metrics::record_store_submission("malformed");
            return (StatusCode::BAD_REQUEST, rejection.body_text()).into_response();
        }
    };

    match store.accept(payload) {
        Ok(draft) => {
            tracing::info!(methods = draft.methods.len(), budget = draft.budget, "Configuration stored");
            metrics::record_store_submission("accepted");
            Json(SubmitResponse { success: true }).into_response()
        }
        Err(errors) => {
            for err in &errors {
                tracing::info!(error = %err, "Submission declined");
            }
            metrics::record_store_submission("declined");
            Json(SubmitResponse { success: false }).into_response()
        }
    }
}
