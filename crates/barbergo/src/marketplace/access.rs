use serde::{Deserialize, Serialize};

pub const LOGIN_PATH: &str = "/login";

/// Account type carried by an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Barber,
    Admin,
}

impl Role {
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Customer => "/customer/dashboard",
            Role::Barber => "/barber/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Role::Customer),
            "barber" => Some(Role::Barber),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// What the auth collaborator has resolved so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "role", rename_all = "snake_case")]
pub enum AuthState {
    Pending,
    Anonymous,
    Authenticated(Role),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Auth has not resolved yet; render nothing.
    Wait,
    Allow,
    Redirect { to: String },
}

/// Decide whether the user may enter the dashboard area belonging to `area`.
pub fn resolve_access(auth: AuthState, area: Role) -> AccessDecision {
    match auth {
        AuthState::Pending => AccessDecision::Wait,
        AuthState::Anonymous => AccessDecision::Redirect {
            to: LOGIN_PATH.to_string(),
        },
        AuthState::Authenticated(role) if role == area => AccessDecision::Allow,
        AuthState::Authenticated(role) => AccessDecision::Redirect {
            to: role.dashboard_path().to_string(),
        },
    }
}
