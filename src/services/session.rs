//! Authentication context of the current user.

use std::sync::Arc;

use parking_lot::Mutex;
use validator::Validate;

use crate::domain::types::{UserEmail, UserName};
use crate::dto::api::LoginRequest;
use crate::forms::login::{Credentials, LoginForm};
use crate::repository::SessionWriter;
use crate::services::{ServiceError, ServiceResult};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: UserName,
    pub email: UserEmail,
}

/// Starts unauthenticated; `login` and `logout` are the only transitions.
pub struct Session<R: ?Sized> {
    repo: Arc<R>,
    user: Mutex<Option<User>>,
}

impl<R> Session<R>
where
    R: SessionWriter + ?Sized,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            user: Mutex::new(None),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.lock().is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.user.lock().clone()
    }

    /// Signs in with the service.
    ///
    /// Invalid input is an error; a rejected or failed call returns `false`.
    pub async fn login(&self, form: LoginForm) -> ServiceResult<bool> {
        if let Err(err) = form.validate() {
            log::error!("Failed to validate login form: {err}");
            return Err(ServiceError::Form(
                "Please enter your name and a valid email address".to_string(),
            ));
        }
        let credentials = Credentials::try_from(form)?;

        let success = match self.repo.login(&LoginRequest::from(&credentials)).await {
            Ok(success) => success,
            Err(err) => {
                log::error!("Login failed: {err}");
                false
            }
        };

        if success {
            log::info!("Signed in as {}", credentials.name);
            *self.user.lock() = Some(User {
                name: credentials.name,
                email: credentials.email,
            });
        }

        Ok(success)
    }

    /// Signs out. Local state is cleared even when the service call fails.
    pub async fn logout(&self) {
        if let Err(err) = self.repo.logout().await {
            log::error!("Logout error: {err}");
        }
        *self.user.lock() = None;
    }
}
