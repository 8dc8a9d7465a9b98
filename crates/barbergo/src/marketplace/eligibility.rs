//! Operational state of a barber account.
//!
//! States are checked in a fixed order: blocked, then suspended, then active. A suspension
//! whose end has passed counts as active even while the stored flag is still set; the flag
//! is only cleared by an explicit write (see `MarketplaceService::expire_lapsed_suspensions`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::BarberAccount;

/// Reason reported when a suspension was recorded without one.
pub const DEFAULT_SUSPENSION_REASON: &str = "terms violation";

const SECONDS_PER_DAY: i64 = 86_400;

/// Result of evaluating an account at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EligibilityState {
    Active,
    Blocked,
    Suspended {
        #[serde(rename = "remainingDays")]
        remaining_days: u32,
        reason: String,
    },
}

impl EligibilityState {
    pub fn is_active(&self) -> bool {
        matches!(self, EligibilityState::Active)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EligibilityState::Active => "active",
            EligibilityState::Blocked => "blocked",
            EligibilityState::Suspended { .. } => "suspended",
        }
    }
}

pub fn evaluate(account: &BarberAccount, now: DateTime<Utc>) -> EligibilityState {
    if account.is_blocked {
        return EligibilityState::Blocked;
    }

    if account.is_suspended {
        if let Some(until) = account.suspended_until.filter(|until| *until > now) {
            let reason = account
                .suspension_reason
                .as_deref()
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .unwrap_or(DEFAULT_SUSPENSION_REASON)
                .to_string();

            return EligibilityState::Suspended {
                remaining_days: remaining_days(until, now),
                reason,
            };
        }
    }

    EligibilityState::Active
}

/// Active and switched on by the barber.
pub fn is_eligible(account: &BarberAccount, now: DateTime<Utc>) -> bool {
    account.is_available && evaluate(account, now).is_active()
}

/// Whole days until `until`, partial days rounded up. Zero once `until` has passed.
pub fn remaining_days(until: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let remaining = until - now;
    let seconds = remaining.num_seconds();
    if seconds < 0 || (seconds == 0 && remaining.subsec_nanos() <= 0) {
        return 0;
    }

    let mut days = seconds / SECONDS_PER_DAY;
    if seconds % SECONDS_PER_DAY != 0 || remaining.subsec_nanos() > 0 {
        days += 1;
    }

    u32::try_from(days).unwrap_or(u32::MAX)
}
