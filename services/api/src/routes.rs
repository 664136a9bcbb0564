use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde_json::json;
use siantar_geotag::error::AppError;
use siantar_geotag::registry::{
    caller_from_headers, registry_router, BusinessRepository, RegistryService,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_registry_routes<R>(service: Arc<RegistryService<R>>) -> Router
where
    R: BusinessRepository + 'static,
{
    let import = Router::new()
        .route("/api/v1/businesses/import", post(import_endpoint::<R>))
        .with_state(service.clone());

    registry_router(service)
        .merge(import)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Accepts a survey sheet as the request body and registers its rows as the caller.
pub(crate) async fn import_endpoint<R>(
    State(service): State<Arc<RegistryService<R>>>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    R: BusinessRepository + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.import_csv(&caller, body.as_bytes(), Utc::now()) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
