use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::domain::{BarberRegistration, ServiceOffering, TimeSlot};
use super::geo::GeoPoint;

/// Rejected profile or admin input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileViolation {
    #[error("barber name must not be empty")]
    EmptyName,
    #[error("location ({latitude}, {longitude}) is outside the valid coordinate range")]
    InvalidLocation { latitude: f64, longitude: f64 },
    #[error("service {service_id} must have a non-negative price, got {price}")]
    InvalidPrice { service_id: String, price: f64 },
    #[error("service {service_id} must have a name")]
    UnnamedService { service_id: String },
    #[error("service id {service_id} is listed more than once")]
    DuplicateService { service_id: String },
    #[error("slot starting {starts_at} must end after it starts")]
    InvalidSlot { starts_at: DateTime<Utc> },
    #[error("suspension must end in the future, got {until}")]
    SuspensionNotInFuture { until: DateTime<Utc> },
}

pub(crate) fn check_registration(registration: &BarberRegistration) -> Result<(), ProfileViolation> {
    if registration.name.trim().is_empty() {
        return Err(ProfileViolation::EmptyName);
    }
    check_location(&registration.location)?;
    check_services(&registration.services)
}

pub(crate) fn check_location(location: &GeoPoint) -> Result<(), ProfileViolation> {
    if location.is_valid() {
        Ok(())
    } else {
        Err(ProfileViolation::InvalidLocation {
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }
}

pub(crate) fn check_services(services: &[ServiceOffering]) -> Result<(), ProfileViolation> {
    let mut seen = HashSet::new();
    for service in services {
        if !service.price.is_finite() || service.price < 0.0 {
            return Err(ProfileViolation::InvalidPrice {
                service_id: service.id.clone(),
                price: service.price,
            });
        }
        if service.name.trim().is_empty() {
            return Err(ProfileViolation::UnnamedService {
                service_id: service.id.clone(),
            });
        }
        if !seen.insert(service.id.as_str()) {
            return Err(ProfileViolation::DuplicateService {
                service_id: service.id.clone(),
            });
        }
    }
    Ok(())
}

/// Validate slots and return them ordered by start time.
pub(crate) fn normalize_slots(mut slots: Vec<TimeSlot>) -> Result<Vec<TimeSlot>, ProfileViolation> {
    if let Some(slot) = slots.iter().find(|slot| slot.starts_at >= slot.ends_at) {
        return Err(ProfileViolation::InvalidSlot {
            starts_at: slot.starts_at,
        });
    }
    slots.sort_by(|left, right| {
        left.starts_at
            .cmp(&right.starts_at)
            .then_with(|| left.ends_at.cmp(&right.ends_at))
    });
    Ok(slots)
}

pub(crate) fn check_suspension_end(
    until: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ProfileViolation> {
    if until > now {
        Ok(())
    } else {
        Err(ProfileViolation::SuspensionNotInFuture { until })
    }
}
