use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

#[derive(Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFormPayload {
    pub email: String,
    pub password: String,
}

impl LoginFormPayload {
    /// Compare against the configured administrator. Emails are matched
    /// case-insensitively.
    pub fn matches(&self, admin_email: &str, admin_password: &str) -> bool {
        !admin_password.is_empty()
            && self.email.eq_ignore_ascii_case(admin_email.trim())
            && self.password == admin_password
    }
}

#[derive(Debug, Error)]
pub enum LoginFormError {
    #[error("Login form validation failed: {0}")]
    Validation(String),
}

impl From<ValidationErrors> for LoginFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl TryFrom<LoginForm> for LoginFormPayload {
    type Error = LoginFormError;

    fn try_from(value: LoginForm) -> Result<Self, Self::Error> {
        let value = LoginForm {
            email: value.email.trim().to_string(),
            password: value.password,
        };
        value.validate()?;
        Ok(Self {
            email: value.email,
            password: value.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_configured_admin() {
        let form = LoginForm {
            email: " Admin@Example.com ".to_string(),
            password: "secret".to_string(),
        };
        let payload: LoginFormPayload = form.try_into().unwrap();

        assert!(payload.matches("admin@example.com", "secret"));
        assert!(!payload.matches("admin@example.com", "other"));
    }

    #[test]
    fn empty_configured_password_never_matches() {
        let payload = LoginFormPayload {
            email: "admin@example.com".to_string(),
            password: String::new(),
        };
        assert!(!payload.matches("admin@example.com", ""));
    }

    #[test]
    fn rejects_malformed_email() {
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        let payload: Result<LoginFormPayload, _> = form.try_into();
        assert!(payload.is_err());
    }
}
