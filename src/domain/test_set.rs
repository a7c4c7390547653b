use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::category::GroundTruthCategory;
use crate::domain::types::{JsonExtractionKey, OwnerId, TestSetDescription, TestSetId, TestSetName};

/// A named collection of ground truth categories used to grade model output.
///
/// `categories` is only populated when the aggregate is loaded by id; list
/// views carry `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSet {
    pub id: TestSetId,
    pub name: TestSetName,
    pub description: Option<TestSetDescription>,
    pub json_extraction_key: Option<JsonExtractionKey>,
    pub owner: OwnerId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<GroundTruthCategory>>,
}

impl TestSet {
    /// Drop the loaded categories, producing the list-view shape.
    pub fn into_summary(mut self) -> Self {
        self.categories = None;
        self
    }
}

/// Data required to insert a new [`TestSet`] parent record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTestSet {
    pub name: TestSetName,
    pub description: Option<TestSetDescription>,
    pub json_extraction_key: Option<JsonExtractionKey>,
    pub owner: OwnerId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Editable fields of a test set as supplied by a caller, before an owner
/// and timestamps are attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSetFields {
    pub name: TestSetName,
    pub description: Option<TestSetDescription>,
    pub json_extraction_key: Option<JsonExtractionKey>,
}

impl TestSetFields {
    /// Stamp the fields with the creating principal and the current time.
    pub fn into_new_test_set(self, owner: OwnerId, now: NaiveDateTime) -> NewTestSet {
        NewTestSet {
            name: self.name,
            description: self.description,
            json_extraction_key: self.json_extraction_key,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Treat every field as changed.
    pub fn into_changes(self) -> TestSetChanges {
        TestSetChanges {
            name: Some(self.name),
            description: Some(self.description),
            json_extraction_key: Some(self.json_extraction_key),
        }
    }
}

/// Partial update of the parent record.
///
/// `None` leaves a field untouched; for the optional fields `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TestSetChanges {
    pub name: Option<TestSetName>,
    pub description: Option<Option<TestSetDescription>>,
    pub json_extraction_key: Option<Option<JsonExtractionKey>>,
}

/// Outcome of a delete request against the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestSetDeletion {
    Deleted,
    /// Dependent evaluations exist. The count is unknown when the refusal
    /// came from the store's referential check rather than the pre-count.
    InUse { usage_count: Option<i64> },
}
