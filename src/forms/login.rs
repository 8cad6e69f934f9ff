use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{TypeConstraintError, UserEmail, UserName};
use crate::dto::api::LoginRequest;

/// Raw sign-in input as typed by the user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

impl LoginForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Validated sign-in payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: UserName,
    pub email: UserEmail,
}

impl TryFrom<LoginForm> for Credentials {
    type Error = TypeConstraintError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        Ok(Self {
            name: UserName::new(form.name)?,
            email: UserEmail::new(form.email)?,
        })
    }
}

impl From<&Credentials> for LoginRequest {
    fn from(credentials: &Credentials) -> Self {
        Self {
            name: credentials.name.as_str().to_string(),
            email: credentials.email.as_str().to_string(),
        }
    }
}
