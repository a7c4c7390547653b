use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The targeted row does not exist.
    #[error("record not found")]
    NotFound,
    /// The store rejected a statement.
    #[error("database error: {0}")]
    Database(#[from] DieselError),
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    /// Category insert failed after the parent row was written; the parent
    /// was removed again.
    #[error("failed to save categories, test set creation was rolled back: {0}")]
    RolledBack(String),
    /// A stored row no longer satisfies domain constraints.
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl RepositoryError {
    /// Whether the store refused the statement because of a foreign key.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Self::Database(e) => is_foreign_key_error(e),
            _ => false,
        }
    }
}

/// SQLite reports a failed `ON DELETE RESTRICT` with an unknown error kind,
/// so the driver message is checked as well.
pub fn is_foreign_key_error(error: &DieselError) -> bool {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => true,
        DieselError::DatabaseError(_, info) => {
            info.message().contains("FOREIGN KEY constraint failed")
        }
        _ => false,
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> RepositoryError {
        RepositoryError::Database(DieselError::DatabaseError(
            kind,
            Box::new(message.to_string()),
        ))
    }

    #[test]
    fn sqlite_restrict_failure_is_a_foreign_key_violation() {
        let err = database_error(DatabaseErrorKind::Unknown, "FOREIGN KEY constraint failed");
        assert!(err.is_foreign_key_violation());

        let err = database_error(DatabaseErrorKind::ForeignKeyViolation, "fk");
        assert!(err.is_foreign_key_violation());
    }

    #[test]
    fn other_failures_are_not_foreign_key_violations() {
        let err = database_error(DatabaseErrorKind::UniqueViolation, "UNIQUE constraint failed");
        assert!(!err.is_foreign_key_violation());
        assert!(!RepositoryError::NotFound.is_foreign_key_violation());
    }
}
