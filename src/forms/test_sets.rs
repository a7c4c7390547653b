use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::NewGroundTruthCategory;
use crate::domain::test_set::{TestSetChanges, TestSetFields};
use crate::domain::types::{
    CategoryDescription, CategoryName, JsonExtractionKey, TestSetDescription, TestSetName,
    TypeConstraintError,
};

/// One row of the category editor. Rows left completely blank are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TestSetForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub json_extraction_key: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestSetFormPayload {
    pub fields: TestSetFields,
    pub categories: Vec<NewGroundTruthCategory>,
}

/// Edit form. Omitting `categories` leaves the stored set untouched; an
/// empty list clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTestSetForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub json_extraction_key: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<CategoryRow>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTestSetFormPayload {
    pub changes: TestSetChanges,
    pub categories: Option<Vec<NewGroundTruthCategory>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TestSetFormError {
    #[error("Test set form validation failed: {0}")]
    Validation(String),
    #[error("Test set form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("At least one category is required")]
    MissingCategories,
    #[error("All categories must have both name and description")]
    IncompleteCategory,
    #[error("Category \"{0}\" is listed more than once")]
    DuplicateCategory(String),
}

impl From<ValidationErrors> for TestSetFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for TestSetFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn parse_fields(
    name: String,
    description: Option<String>,
    json_extraction_key: Option<String>,
) -> Result<TestSetFields, TestSetFormError> {
    Ok(TestSetFields {
        name: TestSetName::new(name)?,
        description: description.and_then(TestSetDescription::new_optional),
        json_extraction_key: json_extraction_key.and_then(JsonExtractionKey::new_optional),
    })
}

fn parse_categories(rows: Vec<CategoryRow>) -> Result<Vec<NewGroundTruthCategory>, TestSetFormError> {
    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(rows.len());

    for row in rows {
        let name = row.name.trim();
        let description = row.description.trim();
        if name.is_empty() && description.is_empty() {
            continue;
        }
        if name.is_empty() || description.is_empty() {
            return Err(TestSetFormError::IncompleteCategory);
        }
        if !seen.insert(name.to_string()) {
            return Err(TestSetFormError::DuplicateCategory(name.to_string()));
        }
        categories.push(NewGroundTruthCategory::new(
            CategoryName::new(name)?,
            CategoryDescription::new(description)?,
        ));
    }

    Ok(categories)
}

impl TryFrom<TestSetForm> for TestSetFormPayload {
    type Error = TestSetFormError;

    fn try_from(value: TestSetForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let fields = parse_fields(value.name, value.description, value.json_extraction_key)?;
        let categories = parse_categories(value.categories)?;
        if categories.is_empty() {
            return Err(TestSetFormError::MissingCategories);
        }
        Ok(Self { fields, categories })
    }
}

impl TryFrom<UpdateTestSetForm> for UpdateTestSetFormPayload {
    type Error = TestSetFormError;

    fn try_from(value: UpdateTestSetForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let fields = parse_fields(value.name, value.description, value.json_extraction_key)?;
        let categories = value.categories.map(parse_categories).transpose()?;
        Ok(Self {
            changes: fields.into_changes(),
            categories,
        })
    }
}
