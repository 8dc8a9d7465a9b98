use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// Identifier wrapper for barber accounts. Opaque and immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarberId(pub String);

impl BarberId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BarberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Service a barber offers, priced in the marketplace currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: String,
    pub name: String,
    pub price: f64,
}

/// Bookable window published by a barber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Stored barber account as handed over by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberAccount {
    pub id: BarberId,
    pub name: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub services: Vec<ServiceOffering>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub availability: Vec<TimeSlot>,
    /// Legacy display value written by older clients. Never used for filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl BarberAccount {
    /// Fresh account as created at registration: every flag cleared, no reviews yet.
    pub fn register(id: BarberId, registration: BarberRegistration) -> Self {
        Self {
            id,
            name: registration.name.trim().to_string(),
            location: registration.location,
            is_blocked: false,
            is_suspended: false,
            suspended_until: None,
            suspension_reason: None,
            is_available: false,
            services: registration.services,
            rating: 0.0,
            reviews: 0,
            availability: Vec::new(),
            distance: None,
        }
    }

    pub fn offers(&self, service_id: &str) -> bool {
        self.services.iter().any(|service| service.id == service_id)
    }

    /// True when the stored flag claims a suspension whose end has already passed.
    pub fn has_lapsed_suspension(&self, now: DateTime<Utc>) -> bool {
        self.is_suspended
            && self
                .suspended_until
                .map(|until| until <= now)
                .unwrap_or(true)
    }

    pub fn apply(&mut self, patch: BarberPatch) {
        let BarberPatch {
            location,
            is_blocked,
            suspension,
            is_available,
            services,
            availability,
        } = patch;

        if let Some(location) = location {
            self.location = location;
        }
        if let Some(is_blocked) = is_blocked {
            self.is_blocked = is_blocked;
        }
        match suspension {
            Some(SuspensionPatch::Suspend { until, reason }) => {
                self.is_suspended = true;
                self.suspended_until = Some(until);
                self.suspension_reason = Some(reason);
            }
            Some(SuspensionPatch::Clear) => self.clear_suspension(),
            Some(SuspensionPatch::ClearIfLapsed { now }) => {
                if self.has_lapsed_suspension(now) {
                    self.clear_suspension();
                }
            }
            None => {}
        }
        if let Some(is_available) = is_available {
            self.is_available = is_available;
        }
        if let Some(services) = services {
            self.services = services;
        }
        if let Some(availability) = availability {
            self.availability = availability;
        }
    }

    fn clear_suspension(&mut self) {
        self.is_suspended = false;
        self.suspended_until = None;
        self.suspension_reason = None;
    }
}

/// Partial update forwarded to `BarberRepository::update_barber`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarberPatch {
    pub location: Option<GeoPoint>,
    pub is_blocked: Option<bool>,
    pub suspension: Option<SuspensionPatch>,
    pub is_available: Option<bool>,
    pub services: Option<Vec<ServiceOffering>>,
    pub availability: Option<Vec<TimeSlot>>,
}

/// Suspension changes always move the flag, end and reason together.
#[derive(Debug, Clone, PartialEq)]
pub enum SuspensionPatch {
    Suspend {
        until: DateTime<Utc>,
        reason: String,
    },
    Clear,
    /// Clears only when the suspension stored at write time has lapsed by `now`.
    ClearIfLapsed { now: DateTime<Utc> },
}

/// Payload accepted when a barber signs up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberRegistration {
    pub name: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub services: Vec<ServiceOffering>,
}
