use super::domain::{BarberAccount, BarberId, BarberPatch};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait BarberRepository: Send + Sync {
    fn list_barbers(&self) -> Result<Vec<BarberAccount>, RepositoryError>;
    fn fetch(&self, id: &BarberId) -> Result<Option<BarberAccount>, RepositoryError>;
    fn insert(&self, account: BarberAccount) -> Result<BarberAccount, RepositoryError>;
    /// Apply `patch` to the stored account and return the updated record.
    fn update_barber(
        &self,
        id: &BarberId,
        patch: BarberPatch,
    ) -> Result<BarberAccount, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("barber already exists")]
    Conflict,
    #[error("barber not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
