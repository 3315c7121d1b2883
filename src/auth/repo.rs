use std::{future::Future, time::Duration};

use axum::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::repo_types::User;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The email uniqueness constraint rejected the write.
    #[error("email already registered")]
    Duplicate,
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            StoreError::Duplicate
        } else {
            StoreError::Unavailable(err)
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Persistence for user records. Uniqueness of `email` is enforced here,
/// not by callers.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, password, created_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.db),
        )
        .await
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (email, password)
                VALUES ($1, $2)
                RETURNING id, email, password, created_at
                "#,
            )
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.db),
        )
        .await
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryUserStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;

    use axum::async_trait;
    use time::OffsetDateTime;
    use tokio::sync::Mutex;

    use super::{StoreError, UserStore};
    use crate::auth::repo_types::User;

    /// Mirrors the `users` table: serial ids and a unique email index.
    #[derive(Default)]
    pub(crate) struct MemoryUserStore {
        inner: Mutex<Inner>,
    }

    #[derive(Default)]
    struct Inner {
        next_id: i64,
        by_email: HashMap<String, User>,
    }

    impl MemoryUserStore {
        pub(crate) async fn len(&self) -> usize {
            self.inner.lock().await.by_email.len()
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            Ok(self.inner.lock().await.by_email.get(email).cloned())
        }

        async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
            let mut inner = self.inner.lock().await;
            if inner.by_email.contains_key(email) {
                return Err(StoreError::Duplicate);
            }
            inner.next_id += 1;
            let user = User {
                id: inner.next_id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: OffsetDateTime::now_utc(),
            };
            inner.by_email.insert(email.to_string(), user.clone());
            Ok(user)
        }
    }
}
