use thiserror::Error;

use armetix_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A writer panicked while holding the lock.
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            StoreError::Poisoned => None,
        }
    }
}
