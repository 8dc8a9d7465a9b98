use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::marketplace::router::{register_handler, search_handler, SearchRequest};
use crate::marketplace::{FixedClock, MarketplaceService};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn search_route_returns_ordered_matches_with_distance() {
    let (router, _) = router_with_accounts(riyadh_roster());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/barbers/search",
            json!({
                "origin": { "latitude": 24.7136, "longitude": 46.6753 },
                "maxDistanceKm": 5
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let results = payload.as_array().expect("array payload");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "barber-here");
    assert_eq!(results[1]["id"], "barber-near");
    let distance = results[1]["distanceKm"].as_f64().expect("distance present");
    assert!((distance - 1.5).abs() < 0.05);
}

#[tokio::test]
async fn search_route_uses_service_default_radius() {
    let repository = Arc::new(MemoryRepository::with_accounts(riyadh_roster()));
    let service = MarketplaceService::new(repository, Arc::new(FixedClock(now())))
        .with_default_max_distance(20.0);

    let response = search_handler(
        State(Arc::new(service)),
        axum::Json(SearchRequest {
            origin: RIYADH,
            max_distance_km: None,
            service_id: None,
            limit: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn search_route_rejects_invalid_radius() {
    let (router, _) = router_with_accounts(riyadh_roster());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/barbers/search",
            json!({
                "origin": { "latitude": 24.7136, "longitude": 46.6753 },
                "maxDistanceKm": 0
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("maxDistanceKm"));
}

#[tokio::test]
async fn search_route_rejects_out_of_range_origin() {
    let (router, _) = router_with_accounts(riyadh_roster());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/barbers/search",
            json!({ "origin": { "latitude": 124.0, "longitude": 46.6753 } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(MarketplaceService::new(
        Arc::new(UnavailableRepository),
        Arc::new(FixedClock(now())),
    ));

    let response = search_handler(
        State(service),
        axum::Json(SearchRequest {
            origin: RIYADH,
            max_distance_km: Some(5.0),
            service_id: None,
            limit: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn register_handler_returns_conflict_on_duplicate() {
    let service = Arc::new(MarketplaceService::new(
        Arc::new(ConflictRepository),
        Arc::new(FixedClock(now())),
    ));

    let response = register_handler(
        State(service),
        axum::Json(registration("Nasser", RIYADH)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_route_creates_account() {
    let (router, repository) = router_with_accounts(Vec::new());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/barbers",
            json!({
                "name": "Nasser",
                "location": { "latitude": 24.70, "longitude": 46.70 },
                "services": [{ "id": "haircut", "name": "Haircut", "price": 50 }]
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    let id = payload["id"].as_str().expect("id assigned");
    assert_eq!(payload["isAvailable"], false);
    assert_eq!(repository.stored(id).name, "Nasser");
}

#[tokio::test]
async fn register_route_rejects_blank_name() {
    let (router, _) = router_with_accounts(Vec::new());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/barbers",
            json!({
                "name": "   ",
                "location": { "latitude": 24.70, "longitude": 46.70 }
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn eligibility_route_reports_suspension() {
    let mut suspended = barber("barber-suspended", 24.7136, 46.6753, 4.0);
    suspended.is_suspended = true;
    suspended.suspended_until = Some(now() + Duration::days(2) + Duration::hours(1));
    let (router, _) = router_with_accounts(vec![suspended]);

    let response = router
        .oneshot(empty_request(
            "GET",
            "/api/v1/barbers/barber-suspended/eligibility",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload,
        json!({ "state": "suspended", "remainingDays": 3, "reason": "terms violation" })
    );
}

#[tokio::test]
async fn unknown_barber_returns_not_found() {
    let (router, _) = router_with_accounts(Vec::new());

    let response = router
        .oneshot(empty_request("GET", "/api/v1/barbers/nobody"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_block_route_persists_flag() {
    let (router, repository) = router_with_accounts(riyadh_roster());

    let response = router
        .oneshot(empty_request(
            "POST",
            "/api/v1/admin/barbers/barber-near/block",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["isBlocked"], true);
    assert!(repository.stored("barber-near").is_blocked);
}

#[tokio::test]
async fn admin_suspend_route_rejects_past_end() {
    let (router, repository) = router_with_accounts(riyadh_roster());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/admin/barbers/barber-near/suspend",
            json!({ "until": "2025-02-01T00:00:00Z", "reason": "late" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!repository.stored("barber-near").is_suspended);
}

#[tokio::test]
async fn availability_route_updates_toggle() {
    let (router, repository) = router_with_accounts(riyadh_roster());

    let response = router
        .oneshot(json_request(
            "PUT",
            "/api/v1/barbers/barber-far/availability",
            json!({ "isAvailable": false }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!repository.stored("barber-far").is_available);
}

#[tokio::test]
async fn expire_route_lists_cleared_ids() {
    let mut lapsed = barber("barber-lapsed", 24.7136, 46.6753, 4.0);
    lapsed.is_suspended = true;
    lapsed.suspended_until = Some(now() - Duration::days(1));
    let (router, _) = router_with_accounts(vec![lapsed]);

    let response = router
        .oneshot(empty_request("POST", "/api/v1/admin/suspensions/expire"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "cleared": ["barber-lapsed"] }));
}

#[tokio::test]
async fn access_route_redirects_mismatched_roles() {
    let (router, _) = router_with_accounts(Vec::new());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/access/admin",
            json!({ "auth": { "status": "authenticated", "role": "barber" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload,
        json!({ "decision": "redirect", "to": "/barber/dashboard" })
    );
}

#[tokio::test]
async fn access_route_rejects_unknown_area() {
    let (router, _) = router_with_accounts(Vec::new());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/access/owner",
            json!({ "auth": { "status": "anonymous" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
