use crate::db::{DbConnection, DbPool};
use crate::domain::category::NewGroundTruthCategory;
use crate::domain::test_set::{NewTestSet, TestSet, TestSetChanges, TestSetDeletion};
use crate::domain::types::TestSetId;

pub mod errors;
pub mod test_set;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers and background tasks.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations for the test set aggregate.
pub trait TestSetReader {
    /// List test sets newest first, without categories.
    fn list_test_sets(&self) -> RepositoryResult<Vec<TestSet>>;
    /// Retrieve a test set together with all of its categories.
    fn get_test_set_by_id(&self, id: TestSetId) -> RepositoryResult<Option<TestSet>>;
    /// Number of evaluations that reference the test set.
    fn count_evaluations(&self, id: TestSetId) -> RepositoryResult<i64>;
}

/// Write operations for the test set aggregate.
///
/// Implementations keep the parent record and its categories consistent:
/// a failed write never leaves a partial category set behind.
pub trait TestSetWriter {
    /// Persist a parent record and its categories as one unit.
    ///
    /// Fails with [`RepositoryError::RolledBack`] when the categories cannot
    /// be stored; the parent is not kept in that case.
    fn create_test_set(
        &self,
        test_set: &NewTestSet,
        categories: &[NewGroundTruthCategory],
    ) -> RepositoryResult<TestSet>;
    /// Apply a partial update to the parent record only.
    fn update_test_set(&self, id: TestSetId, changes: &TestSetChanges)
    -> RepositoryResult<TestSet>;
    /// Apply a partial update and replace the whole category set.
    fn update_test_set_with_categories(
        &self,
        id: TestSetId,
        changes: &TestSetChanges,
        categories: &[NewGroundTruthCategory],
    ) -> RepositoryResult<TestSet>;
    /// Delete a test set unless evaluations still depend on it.
    fn delete_test_set(&self, id: TestSetId) -> RepositoryResult<TestSetDeletion>;
}
