use barbergo::marketplace::{
    BarberAccount, BarberId, BarberPatch, BarberRepository, GeoPoint, RepositoryError,
    ServiceOffering, TimeSlot,
};
use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local barber store. Ordered by id so listings are stable.
#[derive(Default, Clone)]
pub(crate) struct InMemoryBarberRepository {
    records: Arc<Mutex<BTreeMap<BarberId, BarberAccount>>>,
}

impl InMemoryBarberRepository {
    pub(crate) fn seeded(accounts: Vec<BarberAccount>) -> Result<Self, RepositoryError> {
        let repository = Self::default();
        for account in accounts {
            repository.insert(account)?;
        }
        Ok(repository)
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<BarberId, BarberAccount>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl BarberRepository for InMemoryBarberRepository {
    fn list_barbers(&self) -> Result<Vec<BarberAccount>, RepositoryError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn fetch(&self, id: &BarberId) -> Result<Option<BarberAccount>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn insert(&self, account: BarberAccount) -> Result<BarberAccount, RepositoryError> {
        let mut guard = self.lock()?;
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
        let mut guard = self.lock()?;
        let account = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        account.apply(patch);
        Ok(account.clone())
    }
}

fn offering(id: &str, name: &str, price: f64) -> ServiceOffering {
    ServiceOffering {
        id: id.to_string(),
        name: name.to_string(),
        price,
    }
}

fn demo_barber(
    id: &str,
    name: &str,
    location: GeoPoint,
    rating: f64,
    reviews: u32,
    now: DateTime<Utc>,
) -> BarberAccount {
    let first_slot = now + Duration::hours(2);
    BarberAccount {
        id: BarberId(id.to_string()),
        name: name.to_string(),
        location,
        is_blocked: false,
        is_suspended: false,
        suspended_until: None,
        suspension_reason: None,
        is_available: true,
        services: vec![
            offering("haircut", "Haircut", 60.0),
            offering("beard", "Beard trim", 35.0),
        ],
        rating,
        reviews,
        availability: vec![
            TimeSlot {
                starts_at: first_slot,
                ends_at: first_slot + Duration::minutes(45),
            },
            TimeSlot {
                starts_at: first_slot + Duration::hours(1),
                ends_at: first_slot + Duration::hours(2),
            },
        ],
        distance: None,
    }
}

/// Riyadh roster covering every eligibility state the marketplace distinguishes.
pub(crate) fn demo_roster(now: DateTime<Utc>) -> Vec<BarberAccount> {
    let mut roster = vec![
        demo_barber(
            "barber-olaya",
            "Ahmed Al-Olaya",
            GeoPoint::new(24.6900, 46.6850),
            4.8,
            127,
            now,
        ),
        demo_barber(
            "barber-malaz",
            "Mohammed Al-Malaz",
            GeoPoint::new(24.6650, 46.7300),
            4.6,
            89,
            now,
        ),
        demo_barber(
            "barber-nakheel",
            "Saud Al-Nakheel",
            GeoPoint::new(24.7450, 46.6300),
            4.9,
            203,
            now,
        ),
        demo_barber(
            "barber-diriyah",
            "Fahad Al-Diriyah",
            GeoPoint::new(24.7340, 46.5750),
            4.5,
            64,
            now,
        ),
    ];

    let mut blocked = demo_barber(
        "barber-blocked",
        "Blocked Barber",
        GeoPoint::new(24.7136, 46.6753),
        4.1,
        12,
        now,
    );
    blocked.is_blocked = true;
    roster.push(blocked);

    let mut suspended = demo_barber(
        "barber-suspended",
        "Suspended Barber",
        GeoPoint::new(24.7000, 46.6800),
        3.9,
        30,
        now,
    );
    suspended.is_suspended = true;
    suspended.suspended_until = Some(now + Duration::days(2) + Duration::hours(1));
    suspended.suspension_reason = Some("Repeated late cancellations".to_string());
    roster.push(suspended);

    let mut offline = demo_barber(
        "barber-offline",
        "Offline Barber",
        GeoPoint::new(24.7200, 46.6700),
        4.7,
        51,
        now,
    );
    offline.is_available = false;
    roster.push(offline);

    roster
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}
