use thiserror::Error;

use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Form error: {0}")]
    Form(String),

    #[error("Type constraint violation: {0}")]
    TypeConstraint(String),

    /// The operation needs state the user has not provided yet.
    #[error("{0}")]
    Precondition(String),

    /// The same operation is already in flight.
    #[error("Operation already in progress")]
    Busy,

    #[error("Entity not found")]
    NotFound,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unauthorized => ServiceError::Unauthorized,
            other => ServiceError::Repository(other),
        }
    }
}
