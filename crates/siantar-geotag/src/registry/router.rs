use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::audit::AuditReport;
use super::domain::{BusinessId, NetworkType, User, UserId, UserRole, DISTRICTS, SUB_DISTRICTS};
use super::filter::FilterCriteria;
use super::repository::{BusinessRepository, RepositoryError};
use super::service::{RegistryService, RegistryServiceError};
use super::stats::MAX_REPORT_YEAR;
use super::submission::{BusinessSubmission, SubmissionError, MIN_FOUNDING_YEAR};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Router builder exposing registration, search, audit, and analytics endpoints.
pub fn registry_router<R>(service: Arc<RegistryService<R>>) -> Router
where
    R: BusinessRepository + 'static,
{
    Router::new()
        .route("/api/v1/catalog", get(catalog_handler))
        .route(
            "/api/v1/businesses",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/businesses/summary", get(summary_handler::<R>))
        .route("/api/v1/businesses/export", get(export_handler::<R>))
        .route("/api/v1/businesses/:business_id", delete(delete_handler::<R>))
        .route("/api/v1/audit", get(audit_handler::<R>))
        .route("/api/v1/analytics", get(analytics_handler::<R>))
        .with_state(service)
}

/// Reads the caller identity forwarded by the upstream gateway.
pub fn caller_from_headers(headers: &HeaderMap) -> Result<User, Response> {
    let id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(UserRole::parse);

    match (id, role) {
        (Some(id), Some(role)) => Ok(User {
            id: UserId(id.to_string()),
            email: String::new(),
            name: String::new(),
            role,
        }),
        _ => {
            let payload = json!({
                "error": format!("requests must carry {USER_ID_HEADER} and {USER_ROLE_HEADER} headers"),
            });
            Err((StatusCode::UNAUTHORIZED, Json(payload)).into_response())
        }
    }
}

fn error_response(error: RegistryServiceError) -> Response {
    match error {
        RegistryServiceError::Submission(SubmissionError::Invalid(errors)) => {
            let payload = json!({
                "error": errors.to_string(),
                "fields": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        RegistryServiceError::Submission(SubmissionError::Location(error)) => {
            let payload = json!({
                "error": error.to_string(),
                "reason": "location_unavailable",
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        RegistryServiceError::Repository(RepositoryError::Conflict(id)) => {
            let payload = json!({
                "error": format!("business {id} already exists"),
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        RegistryServiceError::Repository(RepositoryError::NotFound(id)) => {
            let payload = json!({
                "error": format!("business {id} not found"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        RegistryServiceError::Forbidden => {
            let payload = json!({
                "error": RegistryServiceError::Forbidden.to_string(),
            });
            (StatusCode::FORBIDDEN, Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogResponse {
    pub(crate) districts: &'static [&'static str],
    pub(crate) sub_districts: &'static [&'static str],
    pub(crate) network_types: Vec<NetworkTypeEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NetworkTypeEntry {
    pub(crate) code: &'static str,
    pub(crate) label: &'static str,
}

pub(crate) async fn catalog_handler() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        districts: &DISTRICTS,
        sub_districts: &SUB_DISTRICTS,
        network_types: NetworkType::ordered()
            .into_iter()
            .map(|network_type| NetworkTypeEntry {
                code: network_type.code(),
                label: network_type.label(),
            })
            .collect(),
    })
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<RegistryService<R>>>,
    headers: HeaderMap,
    Json(submission): Json<BusinessSubmission>,
) -> Response
where
    R: BusinessRepository + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.submit(&caller, submission, Utc::now()) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<RegistryService<R>>>,
    headers: HeaderMap,
    Query(criteria): Query<FilterCriteria>,
) -> Response
where
    R: BusinessRepository + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.search(&caller, &criteria) {
        Ok(businesses) => {
            let payload = json!({
                "count": businesses.len(),
                "businesses": businesses,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R>(
    State(service): State<Arc<RegistryService<R>>>,
    headers: HeaderMap,
) -> Response
where
    R: BusinessRepository + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.summary(&caller) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<RegistryService<R>>>,
    headers: HeaderMap,
    Path(business_id): Path<String>,
) -> Response
where
    R: BusinessRepository + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.delete(&caller, &BusinessId(business_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AuditResponse {
    pub(crate) complete: usize,
    #[serde(flatten)]
    pub(crate) report: AuditReport,
}

pub(crate) async fn audit_handler<R>(
    State(service): State<Arc<RegistryService<R>>>,
    headers: HeaderMap,
) -> Response
where
    R: BusinessRepository + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.audit(&caller) {
        Ok(report) => {
            let body = AuditResponse {
                complete: report.complete(),
                report,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnalyticsQuery {
    #[serde(default)]
    pub(crate) year: Option<i32>,
}

pub(crate) async fn analytics_handler<R>(
    State(service): State<Arc<RegistryService<R>>>,
    headers: HeaderMap,
    Query(query): Query<AnalyticsQuery>,
) -> Response
where
    R: BusinessRepository + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    let current_year = query.year.unwrap_or_else(|| Utc::now().year());
    if !(MIN_FOUNDING_YEAR..=MAX_REPORT_YEAR).contains(&current_year) {
        let payload = json!({
            "error": format!("year must be between {MIN_FOUNDING_YEAR} and {MAX_REPORT_YEAR}"),
        });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    match service.analytics(&caller, current_year) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<RegistryService<R>>>,
    headers: HeaderMap,
) -> Response
where
    R: BusinessRepository + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    let mut buffer = Vec::new();
    match service.export_csv(&caller, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"businesses.csv\"".to_string(),
                ),
            ],
            buffer,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}
