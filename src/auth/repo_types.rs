use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database. Never serialized; clients see `PublicUser`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                      // generated, never reused
    pub email: String,                // exact-match login identifier
    #[sqlx(rename = "password")]
    pub password_hash: String,        // Argon2 PHC string
    pub created_at: OffsetDateTime,   // set by the database on insert
}
