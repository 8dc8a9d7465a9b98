use crate::infra::{demo_roster, parse_timestamp, InMemoryBarberRepository};
use barbergo::error::AppError;
use barbergo::marketplace::{
    is_listed, BarberAccount, BarberId, BarberMatch, DiscoveryQuery, EligibilityState,
    FixedClock, GeoPoint, MarketplaceService, MarketplaceServiceError,
};
use chrono::{DateTime, Utc};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Customer latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lat: f64,
    /// Customer longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lng: f64,
    /// Search radius in kilometres (defaults to 10)
    #[arg(long)]
    pub(crate) max_distance_km: Option<f64>,
    /// Only show barbers offering this service id
    #[arg(long)]
    pub(crate) service_id: Option<String>,
    /// Maximum number of barbers to list
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Evaluate as of this RFC 3339 instant (defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Demo barber id, e.g. barber-suspended
    #[arg(long)]
    pub(crate) barber_id: String,
    /// Evaluate as of this RFC 3339 instant (defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) at: Option<DateTime<Utc>>,
}

fn demo_service(
    at: Option<DateTime<Utc>>,
) -> Result<MarketplaceService<InMemoryBarberRepository, FixedClock>, AppError> {
    let now = at.unwrap_or_else(Utc::now);
    let repository = InMemoryBarberRepository::seeded(demo_roster(now))
        .map_err(MarketplaceServiceError::from)?;
    Ok(MarketplaceService::new(
        Arc::new(repository),
        Arc::new(FixedClock(now)),
    ))
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let SearchArgs {
        lat,
        lng,
        max_distance_km,
        service_id,
        limit,
        at,
    } = args;

    let service = demo_service(at)?;
    let mut query = DiscoveryQuery::new(GeoPoint::new(lat, lng));
    if let Some(max_distance_km) = max_distance_km {
        query = query.within_km(max_distance_km);
    }
    query.service_id = service_id;
    query.limit = limit;

    let matches = service.search(&query)?;
    render_matches(&query, &matches);
    Ok(())
}

fn render_matches(query: &DiscoveryQuery, matches: &[BarberMatch]) {
    println!(
        "Barbers within {:.1} km of ({:.4}, {:.4})",
        query.max_distance_km, query.origin.latitude, query.origin.longitude
    );
    if matches.is_empty() {
        println!("- none available");
        return;
    }
    for (index, found) in matches.iter().enumerate() {
        let account = &found.account;
        println!(
            "{:>2}. {} [{}] {:.2} km | rating {:.1} ({} reviews) | {} open slot(s)",
            index + 1,
            account.name,
            account.id,
            found.distance_km,
            account.rating,
            account.reviews,
            account.availability.len()
        );
    }
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let service = demo_service(args.at)?;
    let id = BarberId(args.barber_id);
    let account = service.get(&id)?;
    let state = service.evaluate(&id)?;

    println!("{} [{}]", account.name, account.id);
    match &state {
        EligibilityState::Active => println!("- state: active"),
        EligibilityState::Blocked => println!("- state: blocked"),
        EligibilityState::Suspended {
            remaining_days,
            reason,
        } => println!("- state: suspended for {remaining_days} more day(s) ({reason})"),
    }
    println!(
        "- listed in search: {}",
        listing_label(&account, service.now())
    );
    Ok(())
}

fn listing_label(account: &BarberAccount, now: DateTime<Utc>) -> &'static str {
    if is_listed(account, now) {
        "yes"
    } else {
        "no"
    }
}
