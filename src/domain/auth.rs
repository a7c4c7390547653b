use serde::{Deserialize, Serialize};

use crate::domain::types::{OwnerId, TypeConstraintError};

/// The principal attached to the current session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Stable identifier recorded as the owner of created records.
    pub sub: String,
    pub email: String,
}

impl AuthenticatedUser {
    pub fn owner_id(&self) -> Result<OwnerId, TypeConstraintError> {
        OwnerId::new(self.sub.as_str())
    }
}
