use crate::cli::ServeArgs;
use crate::infra::{demo_roster, AppState, InMemoryBarberRepository};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use barbergo::config::AppConfig;
use barbergo::error::AppError;
use barbergo::marketplace::{Clock, MarketplaceService, MarketplaceServiceError, SystemClock};
use barbergo::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let clock = Arc::new(SystemClock);
    let repository = if config.marketplace.seed_demo_data {
        let roster = demo_roster(clock.now());
        info!(barbers = roster.len(), "seeding demo roster");
        InMemoryBarberRepository::seeded(roster).map_err(MarketplaceServiceError::from)?
    } else {
        InMemoryBarberRepository::default()
    };
    let marketplace = Arc::new(
        MarketplaceService::new(Arc::new(repository), clock)
            .with_default_max_distance(config.marketplace.default_max_distance_km),
    );

    let app = with_marketplace_routes(marketplace)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "barbergo marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}
