use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::test_set::{NewTestSet as DomainNewTestSet, TestSet as DomainTestSet, TestSetChanges};
use crate::domain::types::{
    JsonExtractionKey, OwnerId, TestSetDescription, TestSetName, TypeConstraintError,
};

/// Diesel model representing the `test_sets` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::test_sets)]
pub struct TestSet {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub json_extraction_key: Option<String>,
    pub owner: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`TestSet`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::test_sets)]
pub struct NewTestSet<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub json_extraction_key: Option<&'a str>,
    pub owner: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial update of a `test_sets` row. `None` fields are left untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::test_sets)]
pub struct TestSetChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub json_extraction_key: Option<Option<&'a str>>,
    pub updated_at: NaiveDateTime,
}

impl<'a> TestSetChangeset<'a> {
    pub fn new(changes: &'a TestSetChanges, updated_at: NaiveDateTime) -> Self {
        Self {
            name: changes.name.as_ref().map(TestSetName::as_str),
            description: changes
                .description
                .as_ref()
                .map(|value| value.as_ref().map(TestSetDescription::as_str)),
            json_extraction_key: changes
                .json_extraction_key
                .as_ref()
                .map(|value| value.as_ref().map(JsonExtractionKey::as_str)),
            updated_at,
        }
    }
}

impl TryFrom<TestSet> for DomainTestSet {
    type Error = TypeConstraintError;

    fn try_from(test_set: TestSet) -> Result<Self, Self::Error> {
        Ok(Self {
            id: test_set.id.try_into()?,
            name: TestSetName::new(test_set.name)?,
            description: test_set.description.and_then(TestSetDescription::new_optional),
            json_extraction_key: test_set
                .json_extraction_key
                .and_then(JsonExtractionKey::new_optional),
            owner: OwnerId::new(test_set.owner)?,
            created_at: test_set.created_at,
            updated_at: test_set.updated_at,
            categories: None,
        })
    }
}

impl<'a> From<&'a DomainNewTestSet> for NewTestSet<'a> {
    fn from(test_set: &'a DomainNewTestSet) -> Self {
        Self {
            name: test_set.name.as_str(),
            description: test_set.description.as_ref().map(TestSetDescription::as_str),
            json_extraction_key: test_set
                .json_extraction_key
                .as_ref()
                .map(JsonExtractionKey::as_str),
            owner: test_set.owner.as_str(),
            created_at: test_set.created_at,
            updated_at: test_set.updated_at,
        }
    }
}
