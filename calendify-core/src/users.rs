//! User registration, login and username resolution.

use std::sync::Arc;

use crate::calendar::Calendar;
use crate::error::{CoreResult, Error};
use crate::notify::{welcome_message, Notifier};
use crate::store::EntityStore;
use crate::user::{validate_username, User, UserId};

/// Credential hashing and verification, supplied by the embedding
/// application. The engine stores and compares only opaque hashes.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, password_hash: &str) -> bool;
}

pub struct UserService {
    store: Arc<dyn EntityStore>,
    notifier: Arc<dyn Notifier>,
}

impl UserService {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Arc<dyn Notifier>) -> Self {
        UserService { store, notifier }
    }

    /// Register a new account and its default calendar.
    ///
    /// The two writes are not transactional. If the calendar write fails,
    /// the user document already exists without a default calendar; the
    /// error is surfaced and the state is recoverable (the account can be
    /// repaired, and nothing else assumes the calendar is present).
    pub async fn register(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<String>,
    ) -> CoreResult<User> {
        validate_username(username)?;
        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(Error::Validation("Username already exists".to_string()));
        }

        let mut user = User::new(username, password_hash, email);
        self.store.put_user(&user).await?;
        tracing::info!(user_id = %user.user_id, username, "user registered");

        let calendar = Calendar::default_for(&user.user_id, username);
        self.store.put_calendar(&calendar).await?;
        user.default_calendar_id = Some(calendar.calendar_id.clone());
        user.link_calendar(&calendar.calendar_id);
        self.store.put_user(&user).await?;

        if let Some(email) = &user.email {
            let (subject, body) = welcome_message(username);
            if !self.notifier.notify(email, &subject, &body).await {
                tracing::warn!(username, "welcome notification failed");
            }
        }

        Ok(user)
    }

    /// Check credentials and return the account.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        hasher: &dyn PasswordHasher,
    ) -> CoreResult<User> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| Error::UserNotFound(username.to_string()))?;

        if !hasher.verify(password, &user.password_hash) {
            tracing::warn!(username, "login rejected: bad credentials");
            return Err(Error::InvalidCredentials);
        }
        Ok(user)
    }

    /// Identity-resolver interface: username to user id.
    pub async fn resolve_username(&self, username: &str) -> CoreResult<Option<UserId>> {
        Ok(self
            .store
            .find_user_by_username(username)
            .await?
            .map(|u| u.user_id))
    }
}
