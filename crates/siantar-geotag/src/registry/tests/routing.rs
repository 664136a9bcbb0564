use super::common::*;
use crate::registry::router::{USER_ID_HEADER, USER_ROLE_HEADER};
use crate::registry::stats::AnalyticsSettings;
use crate::registry::{registry_router, RegistryService};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn request(method: Method, uri: &str, caller: Option<(&str, &str)>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = caller {
        builder = builder
            .header(USER_ID_HEADER, id)
            .header(USER_ROLE_HEADER, role);
    }
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .expect("request")
}

fn submission_json() -> Value {
    json!({
        "legal_name": "Toko Sinar Jaya",
        "commercial_name": "Sinar Jaya",
        "address": "Jl. Sutomo No. 21",
        "district": "Siantar Barat",
        "sub_district": "Teladan",
        "sls_code": "1272010001",
        "phone": "081234567890",
        "email": "sinarjaya@example.com",
        "founding_year": 2012,
        "activity_description": "Perdagangan eceran sembako dan alat tulis",
        "network_type": "Tunggal",
        "location": { "status": "fixed", "latitude": 2.9595, "longitude": 99.0687 }
    })
}

fn submission_body() -> Body {
    Body::from(submission_json().to_string())
}

fn seeded_records() -> Vec<crate::registry::Business> {
    let alice = officer("alice");
    vec![
        owned_by(business("b-1", "Toko A", "Jl. Merdeka 1", "Siantar Barat", "Teladan"), &alice),
        owned_by(business("b-2", "toko a", "jl. merdeka 1", "Siantar Timur", "Toba"), &alice),
        business("b-3", "Bengkel Maju", "Jl. Sutomo 5", "Siantar Barat", "Merdeka"),
    ]
}

#[tokio::test]
async fn submit_returns_created_record() {
    let (app, repository) = router_with_records(Vec::new());

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/v1/businesses",
            Some(("alice", "user")),
            submission_body(),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["submitted_by"], "alice");
    assert_eq!(payload["network_type"], "Tunggal");
    assert_eq!(repository.snapshot().len(), 1);
}

#[tokio::test]
async fn invalid_submission_lists_field_errors() {
    let (app, repository) = router_with_records(Vec::new());
    let body = Body::from(
        json!({
            "legal_name": "X",
            "address": "Jl. Sutomo No. 21",
            "location": { "status": "fixed", "latitude": 2.9, "longitude": 99.0 }
        })
        .to_string(),
    );

    let response = app
        .oneshot(request(Method::POST, "/api/v1/businesses", Some(("alice", "user")), body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["fields"]["legal_name"].is_array());
    assert!(payload["fields"]["email"].is_array());
    assert!(payload["fields"].get("address").is_none());
    assert!(repository.snapshot().is_empty());
}

#[tokio::test]
async fn denied_location_is_reported_as_unavailable() {
    let (app, _) = router_with_records(Vec::new());
    let mut value = submission_json();
    value["location"] = json!({ "status": "permission_denied" });

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/v1/businesses",
            Some(("alice", "user")),
            Body::from(value.to_string()),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["reason"], "location_unavailable");
}

#[tokio::test]
async fn repository_conflict_maps_to_409() {
    let service = RegistryService::new(Arc::new(ConflictRepository), AnalyticsSettings::default());
    let app = registry_router(Arc::new(service));

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/v1/businesses",
            Some(("alice", "user")),
            submission_body(),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let (app, _) = router_with_records(seeded_records());

    let response = app
        .oneshot(request(Method::GET, "/api/v1/businesses", None, Body::empty()))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_applies_text_and_area_filters() {
    let (app, _) = router_with_records(seeded_records());

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/v1/businesses?q=TOKO&district=Siantar%20Barat",
            Some(("1", "admin")),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["count"], 1);
    assert_eq!(payload["businesses"][0]["id"], "b-1");

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/v1/businesses",
            Some(("alice", "user")),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    let payload = read_json_body(response).await;
    assert_eq!(payload["count"], 2);
}

#[tokio::test]
async fn delete_enforces_ownership() {
    let (app, repository) = router_with_records(seeded_records());

    let forbidden = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            "/api/v1/businesses/b-1",
            Some(("bob", "user")),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let deleted = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            "/api/v1/businesses/b-1",
            Some(("alice", "user")),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = app
        .oneshot(request(
            Method::DELETE,
            "/api/v1/businesses/b-1",
            Some(("1", "admin")),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(repository.snapshot().len(), 2);
}

#[tokio::test]
async fn audit_reports_duplicates_for_admins_only() {
    let (app, _) = router_with_records(seeded_records());

    let refused = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/audit", Some(("alice", "user")), Body::empty()))
        .await
        .expect("router responds");
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(Method::GET, "/api/v1/audit", Some(("1", "admin")), Body::empty()))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], 3);
    assert_eq!(payload["complete"], 3);
    let ids: Vec<&str> = payload["duplicates"]
        .as_array()
        .expect("duplicates array")
        .iter()
        .filter_map(|entry| entry["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["b-1", "b-2"]);
}

#[tokio::test]
async fn analytics_honours_requested_year() {
    let (app, _) = router_with_records(seeded_records());

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/v1/analytics?year=2025",
            Some(("1", "admin")),
            Body::empty(),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], 3);
    assert_eq!(payload["current_year"], 2025);
    assert_eq!(payload["by_district"][0]["name"], "Siantar Barat");
    assert_eq!(payload["by_district"][0]["count"], 2);
    let years = payload["founding_years"].as_array().expect("series");
    assert_eq!(years.len(), 10);
    assert_eq!(years[0]["year"], 2016);
}

#[tokio::test]
async fn analytics_rejects_years_outside_the_reporting_range() {
    let (app, _) = router_with_records(seeded_records());

    for uri in ["/api/v1/analytics?year=-5", "/api/v1/analytics?year=10000"] {
        let response = app
            .clone()
            .oneshot(request(Method::GET, uri, Some(("1", "admin")), Body::empty()))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let payload = read_json_body(response).await;
        assert_eq!(payload["error"], "year must be between 1900 and 9999");
    }

    let boundary = app
        .oneshot(request(
            Method::GET,
            "/api/v1/analytics?year=1900",
            Some(("1", "admin")),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_eq!(boundary.status(), StatusCode::OK);
}

#[tokio::test]
async fn summary_counts_only_records_the_caller_can_see() {
    let (app, _) = router_with_records(seeded_records());

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/v1/businesses/summary",
            Some(("alice", "user")),
            Body::empty(),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], 2);
    assert_eq!(payload["active_districts"], 2);
    assert_eq!(payload["active_sub_districts"], 2);
    assert_eq!(payload["by_district"][0]["name"], "Siantar Barat");
    assert_eq!(payload["by_district"][0]["count"], 1);
    assert_eq!(payload["by_sub_district"].as_array().map(Vec::len), Some(14));

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/v1/businesses/summary",
            Some(("1", "admin")),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], 3);
    assert_eq!(payload["by_district"][0]["count"], 2);
}

#[tokio::test]
async fn export_serves_csv_attachment() {
    let (app, _) = router_with_records(seeded_records());

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/v1/businesses/export",
            Some(("1", "admin")),
            Body::empty(),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert_eq!(text.lines().count(), 4);
}

#[tokio::test]
async fn catalog_lists_areas_and_network_types() {
    let (app, _) = router_with_records(Vec::new());

    let response = app
        .oneshot(request(Method::GET, "/api/v1/catalog", None, Body::empty()))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["districts"].as_array().map(Vec::len), Some(8));
    assert_eq!(payload["sub_districts"].as_array().map(Vec::len), Some(14));
    assert_eq!(payload["network_types"][1]["code"], "Cabang");
}
