use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;
use validator::Validate;

/// Coarse authorization tier gating specific endpoints.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default tier for every new signup.
    User,
    /// Full access, including user administration.
    Admin,
    /// Support staff tier.
    Support,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
            Role::Support => write!(f, "support"),
        }
    }
}

/// A user account as stored in the `users` table.
///
/// `password_hash` is never serialized into responses and the manual `Debug`
/// impl redacts it, so the digest cannot leak through logging.
#[derive(Serialize, Deserialize, Clone, FromRow)]
pub struct Account {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    /// Soft-delete flag. Inactive accounts are invisible to normal lookups
    /// and are treated as non-existent by every auth check.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Account {
    /// Column list matching the `FromRow` field order, for runtime queries.
    pub(crate) const COLUMNS: &'static str =
        "id, full_name, email, phone, password_hash, role, is_active, created_at, updated_at";

    /// Looks up an active account by id. Soft-deleted accounts are not found.
    pub async fn find_active_by_id(pool: &PgPool, id: i32) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND is_active = TRUE",
            Account::COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Looks up an active account by its normalized (lowercased) email.
    pub async fn find_active_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND is_active = TRUE",
            Account::COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }
}

/// Payload for full or partial account updates (admin endpoints).
#[derive(Debug, Deserialize, Validate)]
pub struct AccountUpdate {
    #[validate(length(min = 8, max = 120))]
    pub full_name: Option<String>,
    #[validate(length(min = 8, max = 20))]
    pub phone: Option<String>,
}

/// Payload for the authenticated user's own password change.
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordChange {
    pub old_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Payload for an admin changing another account's role.
#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}
