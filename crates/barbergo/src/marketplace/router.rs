use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::access::{resolve_access, AuthState, Role};
use super::clock::Clock;
use super::discovery::DiscoveryQuery;
use super::domain::{BarberAccount, BarberId, BarberRegistration, ServiceOffering, TimeSlot};
use super::geo::GeoPoint;
use super::repository::{BarberRepository, RepositoryError};
use super::service::{MarketplaceService, MarketplaceServiceError};

type SharedService<R, C> = Arc<MarketplaceService<R, C>>;

/// Router builder exposing discovery, profile, admin and access endpoints.
pub fn marketplace_router<R, C>(service: SharedService<R, C>) -> Router
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/barbers", post(register_handler::<R, C>))
        .route("/api/v1/barbers/search", post(search_handler::<R, C>))
        .route("/api/v1/barbers/:barber_id", get(get_handler::<R, C>))
        .route(
            "/api/v1/barbers/:barber_id/eligibility",
            get(eligibility_handler::<R, C>),
        )
        .route(
            "/api/v1/barbers/:barber_id/availability",
            put(availability_handler::<R, C>),
        )
        .route(
            "/api/v1/barbers/:barber_id/location",
            put(location_handler::<R, C>),
        )
        .route(
            "/api/v1/barbers/:barber_id/services",
            put(services_handler::<R, C>),
        )
        .route(
            "/api/v1/barbers/:barber_id/slots",
            put(slots_handler::<R, C>),
        )
        .route(
            "/api/v1/admin/barbers/:barber_id/block",
            post(block_handler::<R, C>),
        )
        .route(
            "/api/v1/admin/barbers/:barber_id/unblock",
            post(unblock_handler::<R, C>),
        )
        .route(
            "/api/v1/admin/barbers/:barber_id/suspend",
            post(suspend_handler::<R, C>),
        )
        .route(
            "/api/v1/admin/barbers/:barber_id/unsuspend",
            post(unsuspend_handler::<R, C>),
        )
        .route(
            "/api/v1/admin/suspensions/expire",
            post(expire_handler::<R, C>),
        )
        .route("/api/v1/access/:area", post(access_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest {
    pub(crate) origin: GeoPoint,
    #[serde(default)]
    pub(crate) max_distance_km: Option<f64>,
    #[serde(default)]
    pub(crate) service_id: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AvailabilityRequest {
    pub(crate) is_available: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuspendRequest {
    pub(crate) until: DateTime<Utc>,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessRequest {
    pub(crate) auth: AuthState,
}

pub(crate) async fn search_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Json(request): Json<SearchRequest>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    let query = DiscoveryQuery {
        origin: request.origin,
        max_distance_km: request
            .max_distance_km
            .unwrap_or_else(|| service.default_max_distance_km()),
        service_id: request.service_id,
        limit: request.limit,
    };

    match service.search(&query) {
        Ok(matches) => (StatusCode::OK, Json(matches)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn register_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Json(registration): Json<BarberRegistration>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    match service.register(registration) {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.get(&BarberId(barber_id)))
}

pub(crate) async fn eligibility_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    match service.evaluate(&BarberId(barber_id)) {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn availability_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
    Json(request): Json<AvailabilityRequest>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.set_availability(&BarberId(barber_id), request.is_available))
}

pub(crate) async fn location_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
    Json(location): Json<GeoPoint>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.update_location(&BarberId(barber_id), location))
}

pub(crate) async fn services_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
    Json(services): Json<Vec<ServiceOffering>>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.update_services(&BarberId(barber_id), services))
}

pub(crate) async fn slots_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
    Json(slots): Json<Vec<TimeSlot>>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.update_slots(&BarberId(barber_id), slots))
}

pub(crate) async fn block_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.block(&BarberId(barber_id)))
}

pub(crate) async fn unblock_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.unblock(&BarberId(barber_id)))
}

pub(crate) async fn suspend_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
    Json(request): Json<SuspendRequest>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.suspend(&BarberId(barber_id), request.until, request.reason))
}

pub(crate) async fn unsuspend_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(barber_id): Path<String>,
) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    account_response(service.lift_suspension(&BarberId(barber_id)))
}

pub(crate) async fn expire_handler<R, C>(State(service): State<SharedService<R, C>>) -> Response
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    match service.expire_lapsed_suspensions() {
        Ok(cleared) => (StatusCode::OK, Json(json!({ "cleared": cleared }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn access_handler(
    Path(area): Path<String>,
    Json(request): Json<AccessRequest>,
) -> Response {
    match Role::parse(&area) {
        Some(area) => {
            let decision = resolve_access(request.auth, area);
            (StatusCode::OK, Json(decision)).into_response()
        }
        None => {
            let payload = json!({ "error": format!("unknown dashboard area '{area}'") });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

fn account_response(result: Result<BarberAccount, MarketplaceServiceError>) -> Response {
    match result {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_response(err: MarketplaceServiceError) -> Response {
    let status = match &err {
        MarketplaceServiceError::Discovery(_) => StatusCode::BAD_REQUEST,
        MarketplaceServiceError::Profile(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MarketplaceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MarketplaceServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        MarketplaceServiceError::Repository(RepositoryError::Unavailable(_)) => {
            warn!(error = %err, "marketplace request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
