//! Barber discovery and account eligibility.
//!
//! `eligibility` and `discovery` are pure functions of their inputs and an injected instant.
//! Everything that touches storage or logs lives in `service` and `router`.

pub mod access;
pub mod clock;
pub mod discovery;
pub mod domain;
pub mod eligibility;
pub mod geo;
pub(crate) mod profile;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use access::{resolve_access, AccessDecision, AuthState, Role};
pub use clock::{Clock, FixedClock, SystemClock};
pub use discovery::{is_listed, search, BarberMatch, DiscoveryError, DiscoveryQuery};
pub use domain::{
    BarberAccount, BarberId, BarberPatch, BarberRegistration, ServiceOffering, SuspensionPatch,
    TimeSlot,
};
pub use eligibility::{evaluate, is_eligible, EligibilityState, DEFAULT_SUSPENSION_REASON};
pub use geo::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use profile::ProfileViolation;
pub use repository::{BarberRepository, RepositoryError};
pub use router::marketplace_router;
pub use service::{MarketplaceService, MarketplaceServiceError};
