use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::marketplace::clock::FixedClock;
use crate::marketplace::domain::{
    BarberAccount, BarberId, BarberPatch, BarberRegistration, ServiceOffering,
};
use crate::marketplace::geo::GeoPoint;
use crate::marketplace::repository::{BarberRepository, RepositoryError};
use crate::marketplace::{marketplace_router, MarketplaceService};

pub(super) const RIYADH: GeoPoint = GeoPoint {
    latitude: 24.7136,
    longitude: 46.6753,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn haircut() -> ServiceOffering {
    ServiceOffering {
        id: "haircut".to_string(),
        name: "Classic haircut".to_string(),
        price: 60.0,
    }
}

pub(super) fn registration(name: &str, location: GeoPoint) -> BarberRegistration {
    BarberRegistration {
        name: name.to_string(),
        location,
        services: vec![haircut()],
    }
}

/// Available, unflagged barber at the given point.
pub(super) fn barber(id: &str, latitude: f64, longitude: f64, rating: f64) -> BarberAccount {
    let mut account = BarberAccount::register(
        BarberId(id.to_string()),
        registration(&format!("Barber {id}"), GeoPoint::new(latitude, longitude)),
    );
    account.is_available = true;
    account.rating = rating;
    account.reviews = 12;
    account
}

pub(super) fn riyadh_roster() -> Vec<BarberAccount> {
    vec![
        barber("barber-here", 24.7136, 46.6753, 4.2),
        barber("barber-near", 24.7271, 46.6753, 4.8),
        barber("barber-far", 24.8125, 46.6753, 5.0),
    ]
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<BarberId, BarberAccount>>>,
}

impl MemoryRepository {
    pub(super) fn with_accounts(accounts: Vec<BarberAccount>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.records.lock().expect("repository mutex poisoned");
            for account in accounts {
                guard.insert(account.id.clone(), account);
            }
        }
        repository
    }

    pub(super) fn stored(&self, id: &str) -> BarberAccount {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&BarberId(id.to_string()))
            .cloned()
            .expect("record present")
    }
}

impl BarberRepository for MemoryRepository {
    fn list_barbers(&self) -> Result<Vec<BarberAccount>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn fetch(&self, id: &BarberId) -> Result<Option<BarberAccount>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert(&self, account: BarberAccount) -> Result<BarberAccount, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&account.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn update_barber(
        &self,
        id: &BarberId,
        patch: BarberPatch,
    ) -> Result<BarberAccount, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let account = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        account.apply(patch);
        Ok(account.clone())
    }
}

/// Hands out a listing, then lets an admin write land on the stored records
/// before the caller gets to act on that listing.
pub(super) struct RenewingRepository {
    pub(super) inner: MemoryRepository,
    pub(super) renewal: Mutex<Option<(BarberId, BarberPatch)>>,
}

impl RenewingRepository {
    pub(super) fn new(inner: MemoryRepository, id: &str, patch: BarberPatch) -> Self {
        Self {
            inner,
            renewal: Mutex::new(Some((BarberId(id.to_string()), patch))),
        }
    }
}

impl BarberRepository for RenewingRepository {
    fn list_barbers(&self) -> Result<Vec<BarberAccount>, RepositoryError> {
        let listing = self.inner.list_barbers()?;
        let pending = self.renewal.lock().expect("renewal mutex poisoned").take();
        if let Some((id, patch)) = pending {
            self.inner.update_barber(&id, patch)?;
        }
        Ok(listing)
    }

    fn fetch(&self, id: &BarberId) -> Result<Option<BarberAccount>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn insert(&self, account: BarberAccount) -> Result<BarberAccount, RepositoryError> {
        self.inner.insert(account)
    }

    fn update_barber(
        &self,
        id: &BarberId,
        patch: BarberPatch,
    ) -> Result<BarberAccount, RepositoryError> {
        self.inner.update_barber(id, patch)
    }
}

pub(super) struct ConflictRepository;

impl BarberRepository for ConflictRepository {
    fn list_barbers(&self) -> Result<Vec<BarberAccount>, RepositoryError> {
        Ok(Vec::new())
    }

    fn fetch(&self, _id: &BarberId) -> Result<Option<BarberAccount>, RepositoryError> {
        Ok(None)
    }

    fn insert(&self, _account: BarberAccount) -> Result<BarberAccount, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update_barber(
        &self,
        _id: &BarberId,
        _patch: BarberPatch,
    ) -> Result<BarberAccount, RepositoryError> {
        Err(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl BarberRepository for UnavailableRepository {
    fn list_barbers(&self) -> Result<Vec<BarberAccount>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &BarberId) -> Result<Option<BarberAccount>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _account: BarberAccount) -> Result<BarberAccount, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_barber(
        &self,
        _id: &BarberId,
        _patch: BarberPatch,
    ) -> Result<BarberAccount, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    accounts: Vec<BarberAccount>,
) -> (
    MarketplaceService<MemoryRepository, FixedClock>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::with_accounts(accounts));
    let service = MarketplaceService::new(repository.clone(), Arc::new(FixedClock(now())));
    (service, repository)
}

pub(super) fn router_with_accounts(
    accounts: Vec<BarberAccount>,
) -> (axum::Router, Arc<MemoryRepository>) {
    let (service, repository) = build_service(accounts);
    (marketplace_router(Arc::new(service)), repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
