//! Service-level error taxonomy surfaced to callers of cart and checkout operations.

use storefront_core::DomainError;

use crate::catalog::CatalogError;
use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Referenced product/order/user does not exist. Not retryable.
    #[error("not found: {0}")]
    NotFound(String),
    /// The operation violates an invariant. Not retryable.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Persistence or catalog call failed; the caller may retry.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Transient(_))
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
            DomainError::InvalidState(msg) => ServiceError::InvalidState(msg),
            DomainError::InvalidId(msg) => ServiceError::InvalidState(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        ServiceError::Transient(value.to_string())
    }
}

impl From<CatalogError> for ServiceError {
    fn from(value: CatalogError) -> Self {
        ServiceError::Transient(value.to_string())
    }
}
