use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::clock::Clock;
use super::discovery::{self, BarberMatch, DiscoveryError, DiscoveryQuery};
use super::domain::{
    BarberAccount, BarberId, BarberPatch, BarberRegistration, ServiceOffering, SuspensionPatch,
    TimeSlot,
};
use super::eligibility::{self, EligibilityState, DEFAULT_SUSPENSION_REASON};
use super::geo::GeoPoint;
use super::profile::{self, ProfileViolation};
use super::repository::{BarberRepository, RepositoryError};

/// Service composing the persistence collaborator, the clock, and the pure evaluators.
pub struct MarketplaceService<R, C> {
    repository: Arc<R>,
    clock: Arc<C>,
    default_max_distance_km: f64,
}

static BARBER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_barber_id() -> BarberId {
    let id = BARBER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BarberId(format!("barber-{id:06}"))
}

impl<R, C> MarketplaceService<R, C>
where
    R: BarberRepository + 'static,
    C: Clock + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            default_max_distance_km: DiscoveryQuery::DEFAULT_MAX_DISTANCE_KM,
        }
    }

    /// Radius applied when a search request leaves it out.
    pub fn with_default_max_distance(mut self, max_distance_km: f64) -> Self {
        self.default_max_distance_km = max_distance_km;
        self
    }

    pub fn default_max_distance_km(&self) -> f64 {
        self.default_max_distance_km
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Eligible barbers around the query origin, nearest first.
    pub fn search(&self, query: &DiscoveryQuery) -> Result<Vec<BarberMatch>, MarketplaceServiceError> {
        query.validate()?;
        let candidates = self.repository.list_barbers()?;
        let matches = discovery::search(query, candidates, self.now())?;
        Ok(matches)
    }

    pub fn get(&self, id: &BarberId) -> Result<BarberAccount, MarketplaceServiceError> {
        let account = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(account)
    }

    pub fn evaluate(&self, id: &BarberId) -> Result<EligibilityState, MarketplaceServiceError> {
        let account = self.get(id)?;
        Ok(eligibility::evaluate(&account, self.now()))
    }

    /// Create a new account with every flag cleared.
    pub fn register(
        &self,
        registration: BarberRegistration,
    ) -> Result<BarberAccount, MarketplaceServiceError> {
        profile::check_registration(&registration)?;
        let account = BarberAccount::register(next_barber_id(), registration);
        let stored = self.repository.insert(account)?;
        info!(barber_id = %stored.id, "barber registered");
        Ok(stored)
    }

    pub fn block(&self, id: &BarberId) -> Result<BarberAccount, MarketplaceServiceError> {
        let account = self.update(
            id,
            BarberPatch {
                is_blocked: Some(true),
                ..BarberPatch::default()
            },
        )?;
        info!(barber_id = %id, "barber blocked");
        Ok(account)
    }

    pub fn unblock(&self, id: &BarberId) -> Result<BarberAccount, MarketplaceServiceError> {
        let account = self.update(
            id,
            BarberPatch {
                is_blocked: Some(false),
                ..BarberPatch::default()
            },
        )?;
        info!(barber_id = %id, "barber unblocked");
        Ok(account)
    }

    /// Suspend until `until`. A blank reason is stored as the default reason.
    pub fn suspend(
        &self,
        id: &BarberId,
        until: DateTime<Utc>,
        reason: Option<String>,
    ) -> Result<BarberAccount, MarketplaceServiceError> {
        profile::check_suspension_end(until, self.now())?;
        let reason = reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| DEFAULT_SUSPENSION_REASON.to_string());

        let account = self.update(
            id,
            BarberPatch {
                suspension: Some(SuspensionPatch::Suspend {
                    until,
                    reason: reason.clone(),
                }),
                ..BarberPatch::default()
            },
        )?;
        info!(barber_id = %id, %until, %reason, "barber suspended");
        Ok(account)
    }

    pub fn lift_suspension(&self, id: &BarberId) -> Result<BarberAccount, MarketplaceServiceError> {
        let account = self.update(
            id,
            BarberPatch {
                suspension: Some(SuspensionPatch::Clear),
                ..BarberPatch::default()
            },
        )?;
        info!(barber_id = %id, "barber suspension lifted");
        Ok(account)
    }

    /// Clear stored suspensions whose end has passed. Returns the ids that were cleared.
    ///
    /// The lapse is re-checked against the stored record inside the update, so a
    /// suspension written after the listing survives the sweep.
    pub fn expire_lapsed_suspensions(&self) -> Result<Vec<BarberId>, MarketplaceServiceError> {
        let now = self.now();
        let candidates: Vec<BarberId> = self
            .repository
            .list_barbers()?
            .into_iter()
            .filter(|account| account.has_lapsed_suspension(now))
            .map(|account| account.id)
            .collect();

        let mut cleared = Vec::with_capacity(candidates.len());
        for id in candidates {
            let account = self.repository.update_barber(
                &id,
                BarberPatch {
                    suspension: Some(SuspensionPatch::ClearIfLapsed { now }),
                    ..BarberPatch::default()
                },
            )?;
            if account.is_suspended {
                info!(barber_id = %id, "suspension renewed before sweep, kept");
            } else {
                cleared.push(id);
            }
        }

        if !cleared.is_empty() {
            info!(count = cleared.len(), "cleared lapsed suspensions");
        }
        Ok(cleared)
    }

    pub fn set_availability(
        &self,
        id: &BarberId,
        is_available: bool,
    ) -> Result<BarberAccount, MarketplaceServiceError> {
        self.update(
            id,
            BarberPatch {
                is_available: Some(is_available),
                ..BarberPatch::default()
            },
        )
    }

    pub fn update_location(
        &self,
        id: &BarberId,
        location: GeoPoint,
    ) -> Result<BarberAccount, MarketplaceServiceError> {
        profile::check_location(&location)?;
        self.update(
            id,
            BarberPatch {
                location: Some(location),
                ..BarberPatch::default()
            },
        )
    }

    pub fn update_services(
        &self,
        id: &BarberId,
        services: Vec<ServiceOffering>,
    ) -> Result<BarberAccount, MarketplaceServiceError> {
        profile::check_services(&services)?;
        self.update(
            id,
            BarberPatch {
                services: Some(services),
                ..BarberPatch::default()
            },
        )
    }

    pub fn update_slots(
        &self,
        id: &BarberId,
        slots: Vec<TimeSlot>,
    ) -> Result<BarberAccount, MarketplaceServiceError> {
        let slots = profile::normalize_slots(slots)?;
        self.update(
            id,
            BarberPatch {
                availability: Some(slots),
                ..BarberPatch::default()
            },
        )
    }

    fn update(
        &self,
        id: &BarberId,
        patch: BarberPatch,
    ) -> Result<BarberAccount, MarketplaceServiceError> {
        self.repository.update_barber(id, patch).map_err(|err| {
            if !matches!(err, RepositoryError::NotFound) {
                warn!(barber_id = %id, error = %err, "barber update failed");
            }
            MarketplaceServiceError::from(err)
        })
    }
}

/// Error raised by the marketplace service.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceServiceError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Profile(#[from] ProfileViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
