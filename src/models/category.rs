use diesel::prelude::*;

use crate::domain::category::{
    GroundTruthCategory as DomainGroundTruthCategory,
    NewGroundTruthCategory as DomainNewGroundTruthCategory,
};
use crate::domain::types::{CategoryDescription, CategoryName, TestSetId, TypeConstraintError};

/// Diesel model representing the `ground_truth_categories` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::ground_truth_categories)]
pub struct GroundTruthCategory {
    pub id: i32,
    pub test_set_id: i32,
    pub name: String,
    pub description: String,
}

/// Insertable form of [`GroundTruthCategory`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::ground_truth_categories)]
pub struct NewGroundTruthCategory<'a> {
    pub test_set_id: i32,
    pub name: &'a str,
    pub description: &'a str,
}

impl<'a> NewGroundTruthCategory<'a> {
    /// Stamp a domain category with the id of its owning test set.
    pub fn for_test_set(test_set_id: TestSetId, category: &'a DomainNewGroundTruthCategory) -> Self {
        Self {
            test_set_id: test_set_id.get(),
            name: category.name.as_str(),
            description: category.description.as_str(),
        }
    }
}

impl TryFrom<GroundTruthCategory> for DomainGroundTruthCategory {
    type Error = TypeConstraintError;

    fn try_from(category: GroundTruthCategory) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            test_set_id: category.test_set_id.try_into()?,
            name: CategoryName::new(category.name)?,
            description: CategoryDescription::new(category.description)?,
        })
    }
}
