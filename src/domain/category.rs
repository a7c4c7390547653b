use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryDescription, CategoryId, CategoryName, TestSetId};

/// A ground truth category owned by exactly one test set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundTruthCategory {
    pub id: CategoryId,
    pub test_set_id: TestSetId,
    pub name: CategoryName,
    pub description: CategoryDescription,
}

/// Data required to insert a new [`GroundTruthCategory`].
///
/// The owning test set id is stamped by the repository at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NewGroundTruthCategory {
    pub name: CategoryName,
    pub description: CategoryDescription,
}

impl NewGroundTruthCategory {
    pub fn new(name: CategoryName, description: CategoryDescription) -> Self {
        Self { name, description }
    }
}

impl From<&GroundTruthCategory> for NewGroundTruthCategory {
    fn from(category: &GroundTruthCategory) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}
