//! Error conversion glue between the form and service layers.

use crate::forms::test_sets::TestSetFormError;
use crate::services::ServiceError;

impl From<TestSetFormError> for ServiceError {
    fn from(val: TestSetFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
