use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::repository::RepositoryError;
use crate::repository::errors::is_foreign_key_error;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// No authenticated principal is attached to the request.
    #[error("not authenticated")]
    Unauthorized,
    /// Requested resource was not found.
    #[error("test set not found")]
    NotFound,
    /// The store refused the write.
    #[error("{0}")]
    Rejected(String),
    /// Categories could not be saved and the new test set was removed again.
    #[error("{0}")]
    RolledBack(String),
    /// Submitted form data failed validation.
    #[error("{0}")]
    Form(String),
    #[error("invalid data: {0}")]
    TypeConstraint(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::RolledBack(_) => ServiceError::RolledBack(val.to_string()),
            RepositoryError::Database(e) => ServiceError::Rejected(rejection_message(&e)),
            RepositoryError::ValidationError(message) => ServiceError::TypeConstraint(message),
            RepositoryError::Pool(_) => ServiceError::Internal,
        }
    }
}

/// Human readable summary of a statement the store refused.
fn rejection_message(error: &DieselError) -> String {
    if is_foreign_key_error(error) {
        return "the test set is still referenced by other records".to_string();
    }
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            "category names must be unique within a test set".to_string()
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
            format!("invalid value: {}", info.message())
        }
        DieselError::DatabaseError(_, info) => info.message().to_string(),
        other => other.to_string(),
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_foreign_key_failure_is_humanized() {
        let err = RepositoryError::Database(DieselError::DatabaseError(
            DatabaseErrorKind::Unknown,
            Box::new("FOREIGN KEY constraint failed".to_string()),
        ));

        assert_eq!(
            ServiceError::from(err),
            ServiceError::Rejected("the test set is still referenced by other records".into())
        );
    }
}
