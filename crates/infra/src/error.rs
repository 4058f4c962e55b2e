use hemolink_core::DomainError;
use thiserror::Error;

use crate::store::StoreError;

/// Failure of an application service call.
///
/// `Domain` failures are deterministic and leave state untouched; `Store`
/// failures mean the commit could not be persisted (and was rolled back).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
