use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::{
    dto::PublicUser,
    error::AuthError,
    password::{hash_password, verify_password},
    repo::UserStore,
};

/// Signup and login over an injected user store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Registers `email`. The existence check is advisory; a concurrent
    /// insert that wins the race surfaces from the store as a duplicate.
    pub async fn signup(&self, email: &str, password: &str) -> Result<PublicUser, AuthError> {
        require_present(email, password)?;

        if self.store.find_by_email(email).await?.is_some() {
            warn!(%email, "signup for existing email");
            return Err(AuthError::DuplicateUser);
        }

        let plain = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hash_password(&plain))
            .await
            .map_err(anyhow::Error::from)??;

        let user = match self.store.insert(email, &hash).await {
            Ok(u) => u,
            Err(e) => {
                let err = AuthError::from(e);
                if matches!(err, AuthError::DuplicateUser) {
                    warn!(%email, "signup lost insert race");
                }
                return Err(err);
            }
        };

        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(user.into())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, AuthError> {
        require_present(email, password)?;

        let user = match self.store.find_by_email(email).await? {
            Some(u) => u,
            None => {
                warn!(%email, "login unknown email");
                return Err(AuthError::UserNotFound);
            }
        };

        let plain = password.to_owned();
        let hash = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
            .await
            .map_err(anyhow::Error::from)??;

        if !ok {
            warn!(%email, user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        debug!(user_id = user.id, "password verified");
        info!(user_id = user.id, email = %user.email, "user logged in");
        Ok(user.into())
    }
}

fn require_present(email: &str, password: &str) -> Result<(), AuthError> {
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(())
}
