//! Test set use cases shared by the HTTP routes and [`crate::store::TestSetStore`].
//!
//! Reads fail soft: a storage error is logged and surfaces as an empty list
//! or a missing record. Writes report every unrecoverable failure through
//! [`ServiceError`], except a delete refused because evaluations still use
//! the test set, which is an ordinary [`DeleteTestSetOutcome`].

use chrono::Utc;
use serde::Serialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::category::NewGroundTruthCategory;
use crate::domain::test_set::{TestSet, TestSetChanges, TestSetDeletion, TestSetFields};
use crate::domain::types::TestSetId;
use crate::repository::{RepositoryError, TestSetReader, TestSetWriter};

use super::{ServiceError, ServiceResult};

/// Result of a delete request as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteTestSetOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<i64>,
}

impl DeleteTestSetOutcome {
    pub fn deleted() -> Self {
        Self {
            success: true,
            message: None,
            usage_count: None,
        }
    }

    pub fn in_use(usage_count: Option<i64>) -> Self {
        let message = match usage_count {
            Some(1) => {
                "Cannot delete this test set because it is used by 1 evaluation.".to_string()
            }
            Some(count) => format!(
                "Cannot delete this test set because it is used by {count} evaluations."
            ),
            None => "Cannot delete this test set because it is used by existing evaluations."
                .to_string(),
        };
        Self {
            success: false,
            message: Some(message),
            usage_count,
        }
    }
}

fn write_error(action: &str, err: RepositoryError) -> ServiceError {
    log::error!("Failed to {action}: {err}");
    err.into()
}

/// List all test sets, newest first, without categories.
pub fn list_test_sets<R>(repo: &R) -> Vec<TestSet>
where
    R: TestSetReader,
{
    match repo.list_test_sets() {
        Ok(test_sets) => test_sets,
        Err(e) => {
            log::error!("Failed to list test sets: {e}");
            Vec::new()
        }
    }
}

/// Load a test set with its categories; `None` when missing or unreadable.
pub fn get_test_set<R>(id: TestSetId, repo: &R) -> Option<TestSet>
where
    R: TestSetReader,
{
    match repo.get_test_set_by_id(id) {
        Ok(test_set) => test_set,
        Err(e) => {
            log::error!("Failed to get test set {id}: {e}");
            None
        }
    }
}

/// Create a test set owned by `principal` together with its categories.
pub fn create_test_set<R>(
    fields: TestSetFields,
    categories: &[NewGroundTruthCategory],
    principal: Option<&AuthenticatedUser>,
    repo: &R,
) -> ServiceResult<TestSet>
where
    R: TestSetWriter,
{
    let Some(principal) = principal else {
        return Err(ServiceError::Unauthorized);
    };

    let owner = principal.owner_id().map_err(|e| {
        log::error!("Invalid principal in session: {e}");
        ServiceError::Unauthorized
    })?;

    let new_test_set = fields.into_new_test_set(owner, Utc::now().naive_utc());

    repo.create_test_set(&new_test_set, categories)
        .map_err(|e| write_error("create test set", e))
}

/// Apply a partial update to the parent record; categories stay as they are.
pub fn update_test_set<R>(
    id: TestSetId,
    changes: &TestSetChanges,
    repo: &R,
) -> ServiceResult<TestSet>
where
    R: TestSetWriter,
{
    repo.update_test_set(id, changes)
        .map_err(|e| write_error("update test set", e))
}

/// Apply a partial update and replace the whole category set.
pub fn update_test_set_with_categories<R>(
    id: TestSetId,
    changes: &TestSetChanges,
    categories: &[NewGroundTruthCategory],
    repo: &R,
) -> ServiceResult<TestSet>
where
    R: TestSetWriter,
{
    repo.update_test_set_with_categories(id, changes, categories)
        .map_err(|e| write_error("update test set categories", e))
}

/// Whether any evaluation references the test set.
pub fn check_test_set_usage<R>(id: TestSetId, repo: &R) -> ServiceResult<bool>
where
    R: TestSetReader,
{
    repo.count_evaluations(id)
        .map(|count| count > 0)
        .map_err(|e| write_error("check test set usage", e))
}

/// Delete a test set unless evaluations depend on it.
pub fn delete_test_set<R>(id: TestSetId, repo: &R) -> ServiceResult<DeleteTestSetOutcome>
where
    R: TestSetWriter,
{
    match repo.delete_test_set(id) {
        Ok(TestSetDeletion::Deleted) => Ok(DeleteTestSetOutcome::deleted()),
        Ok(TestSetDeletion::InUse { usage_count }) => {
            log::info!("Refused to delete test set {id}: still used by evaluations");
            Ok(DeleteTestSetOutcome::in_use(usage_count))
        }
        Err(e) => Err(write_error("delete test set", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CategoryDescription, CategoryName, TestSetDescription, TestSetName};
    use crate::repository::test::TestRepository;

    fn sample_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "admin@example.com".into(),
            email: "admin@example.com".into(),
        }
    }

    fn fields(name: &str) -> TestSetFields {
        TestSetFields {
            name: TestSetName::new(name).unwrap(),
            description: TestSetDescription::new_optional("v1"),
            json_extraction_key: None,
        }
    }

    fn category(name: &str, description: &str) -> NewGroundTruthCategory {
        NewGroundTruthCategory::new(
            CategoryName::new(name).unwrap(),
            CategoryDescription::new(description).unwrap(),
        )
    }

    fn names(test_set: &TestSet) -> Vec<&str> {
        test_set
            .categories
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    #[test]
    fn create_requires_principal() {
        let repo = TestRepository::new();

        let err = create_test_set(fields("Rubric"), &[], None, &repo).unwrap_err();

        assert_eq!(err, ServiceError::Unauthorized);
        assert!(list_test_sets(&repo).is_empty());
    }

    #[test]
    fn create_stamps_owner_and_returns_categories() {
        let repo = TestRepository::new();
        let user = sample_user();

        let created = create_test_set(
            fields("Grading Rubric"),
            &[category("A++", "Excellent")],
            Some(&user),
            &repo,
        )
        .unwrap();

        assert_eq!(created.owner, "admin@example.com");
        assert_eq!(names(&created), vec!["A++"]);

        let loaded = get_test_set(created.id, &repo).unwrap();
        assert_eq!(names(&loaded), vec!["A++"]);
    }

    #[test]
    fn failed_category_insert_reports_rollback_and_leaves_nothing() {
        let repo = TestRepository::new().fail_category_insert(true);
        let user = sample_user();

        let err = create_test_set(
            fields("Rubric"),
            &[category("A", "first")],
            Some(&user),
            &repo,
        )
        .unwrap_err();

        assert!(matches!(err, ServiceError::RolledBack(ref msg) if msg.contains("rolled back")));
        assert!(list_test_sets(&repo).is_empty());
    }

    #[test]
    fn reads_fail_soft() {
        let repo = TestRepository::new();
        let created = create_test_set(fields("Rubric"), &[], Some(&sample_user()), &repo).unwrap();
        repo.set_fail_reads(true);

        assert!(list_test_sets(&repo).is_empty());
        assert!(get_test_set(created.id, &repo).is_none());
    }

    #[test]
    fn usage_check_propagates_errors() {
        let repo = TestRepository::new();
        let created = create_test_set(fields("Rubric"), &[], Some(&sample_user()), &repo).unwrap();
        assert!(!check_test_set_usage(created.id, &repo).unwrap());

        repo.add_evaluation(created.id);
        assert!(check_test_set_usage(created.id, &repo).unwrap());

        repo.set_fail_reads(true);
        assert!(matches!(
            check_test_set_usage(created.id, &repo),
            Err(ServiceError::Rejected(_))
        ));
    }

    #[test]
    fn update_with_empty_categories_clears_them() {
        let repo = TestRepository::new();
        let created = create_test_set(
            fields("Grading Rubric"),
            &[category("A++", "Excellent")],
            Some(&sample_user()),
            &repo,
        )
        .unwrap();

        update_test_set_with_categories(created.id, &TestSetChanges::default(), &[], &repo)
            .unwrap();

        let loaded = get_test_set(created.id, &repo).unwrap();
        assert!(names(&loaded).is_empty());
    }

    #[test]
    fn update_of_missing_test_set_is_not_found() {
        let repo = TestRepository::new();
        let id = TestSetId::new(42).unwrap();

        let err = update_test_set(id, &TestSetChanges::default(), &repo).unwrap_err();

        assert_eq!(err, ServiceError::NotFound);
    }

    #[test]
    fn delete_reports_usage_count() {
        let repo = TestRepository::new();
        let created = create_test_set(fields("Rubric"), &[], Some(&sample_user()), &repo).unwrap();
        repo.add_evaluation(created.id);
        repo.add_evaluation(created.id);

        let outcome = delete_test_set(created.id, &repo).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.usage_count, Some(2));
        assert_eq!(
            outcome.message.as_deref(),
            Some("Cannot delete this test set because it is used by 2 evaluations.")
        );
        assert!(get_test_set(created.id, &repo).is_some());
    }

    #[test]
    fn delete_unused_test_set() {
        let repo = TestRepository::new();
        let created = create_test_set(fields("Rubric"), &[], Some(&sample_user()), &repo).unwrap();

        let outcome = delete_test_set(created.id, &repo).unwrap();

        assert_eq!(outcome, DeleteTestSetOutcome::deleted());
        assert!(get_test_set(created.id, &repo).is_none());
    }

    #[test]
    fn refusal_messages_are_pluralized() {
        assert_eq!(
            DeleteTestSetOutcome::in_use(Some(1)).message.as_deref(),
            Some("Cannot delete this test set because it is used by 1 evaluation.")
        );
        let unknown = DeleteTestSetOutcome::in_use(None);
        assert_eq!(unknown.usage_count, None);
        assert!(unknown.message.unwrap().contains("existing evaluations"));
    }

    #[test]
    fn failed_reload_after_create_returns_parent() {
        let repo = TestRepository::new().fail_reloads(true);

        let created = create_test_set(
            fields("Grading Rubric"),
            &[category("A++", "Excellent")],
            Some(&sample_user()),
            &repo,
        )
        .unwrap();

        assert_eq!(created.name, "Grading Rubric");
        assert!(created.categories.is_none());
        let loaded = get_test_set(created.id, &repo).unwrap();
        assert_eq!(names(&loaded), vec!["A++"]);
    }

    #[test]
    fn failed_reload_after_update_returns_parent() {
        let repo = TestRepository::new();
        let created = create_test_set(fields("Rubric"), &[], Some(&sample_user()), &repo).unwrap();
        let repo = repo.fail_reloads(true);

        let updated = update_test_set_with_categories(
            created.id,
            &TestSetChanges::default(),
            &[category("B", "Good")],
            &repo,
        )
        .unwrap();

        assert!(updated.categories.is_none());
        assert_eq!(names(&get_test_set(created.id, &repo).unwrap()), vec!["B"]);
    }
}
