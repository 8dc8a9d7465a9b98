use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::BarberAccount;
use super::eligibility::is_eligible;
use super::geo::GeoPoint;

/// Customer search around a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryQuery {
    pub origin: GeoPoint,
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    /// Only keep barbers offering this service id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Truncate the ordered result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

fn default_max_distance_km() -> f64 {
    DiscoveryQuery::DEFAULT_MAX_DISTANCE_KM
}

impl DiscoveryQuery {
    pub const DEFAULT_MAX_DISTANCE_KM: f64 = 10.0;

    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            max_distance_km: Self::DEFAULT_MAX_DISTANCE_KM,
            service_id: None,
            limit: None,
        }
    }

    pub fn within_km(mut self, max_distance_km: f64) -> Self {
        self.max_distance_km = max_distance_km;
        self
    }

    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if !self.max_distance_km.is_finite() || self.max_distance_km <= 0.0 {
            return Err(DiscoveryError::InvalidQuery {
                max_distance_km: self.max_distance_km,
            });
        }
        if !self.origin.is_valid() {
            return Err(DiscoveryError::InvalidLocation {
                latitude: self.origin.latitude,
                longitude: self.origin.longitude,
            });
        }
        Ok(())
    }
}

/// Eligible barber with the distance computed for this query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberMatch {
    #[serde(flatten)]
    pub account: BarberAccount,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("maxDistanceKm must be a positive number, got {max_distance_km}")]
    InvalidQuery { max_distance_km: f64 },
    #[error("origin ({latitude}, {longitude}) is outside the valid coordinate range")]
    InvalidLocation { latitude: f64, longitude: f64 },
}

/// Whether `account` can appear in any search result at `now`: eligible, with a stored
/// location inside the coordinate range.
pub fn is_listed(account: &BarberAccount, now: DateTime<Utc>) -> bool {
    account.location.is_valid() && is_eligible(account, now)
}

/// Eligible candidates within range, nearest first.
///
/// Ties on distance go to the higher rating, then to the lower id, so identical input
/// always produces identical output. Any stored `distance` on a candidate is ignored and
/// stripped from the result.
pub fn search<I>(
    query: &DiscoveryQuery,
    candidates: I,
    now: DateTime<Utc>,
) -> Result<Vec<BarberMatch>, DiscoveryError>
where
    I: IntoIterator<Item = BarberAccount>,
{
    query.validate()?;

    let mut matches: Vec<BarberMatch> = candidates
        .into_iter()
        .filter(|account| is_listed(account, now))
        .filter(|account| match &query.service_id {
            Some(service_id) => account.offers(service_id),
            None => true,
        })
        .filter_map(|mut account| {
            let distance_km = query.origin.distance_km(&account.location);
            if distance_km > query.max_distance_km {
                return None;
            }
            account.distance = None;
            Some(BarberMatch {
                account,
                distance_km,
            })
        })
        .collect();

    matches.sort_by(compare_matches);

    if let Some(limit) = query.limit {
        matches.truncate(limit);
    }

    Ok(matches)
}

fn compare_matches(left: &BarberMatch, right: &BarberMatch) -> Ordering {
    left.distance_km
        .total_cmp(&right.distance_km)
        .then_with(|| right.account.rating.total_cmp(&left.account.rating))
        .then_with(|| left.account.id.cmp(&right.account.id))
}
