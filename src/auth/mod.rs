pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use identity::{require_role, AdminUser, CurrentUser};
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenKind, TokenService};

lazy_static! {
    // Regex for phone validation: optional leading +, then digits, spaces, hyphens
    static ref PHONE_REGEX: regex::Regex = regex::Regex::new(r"^\+?[0-9][0-9 \-]{6,18}$").unwrap();
}

/// Represents the payload for a new account signup request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// The person's display name.
    #[validate(length(min = 8, max = 120))]
    pub full_name: String,
    /// Email address for the new account; stored lowercased.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Optional phone number.
    #[validate(
        length(min = 8, max = 20),
        regex(
            path = "PHONE_REGEX",
            message = "Phone must be digits with optional +, spaces, or hyphens"
        )
    )]
    pub phone: Option<String>,
    /// Password for the new account.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Represents the payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email address.
    #[validate(email)]
    pub email: String,
    /// Account password.
    #[validate(length(min = 8))]
    pub password: String,
}

/// Response structure after a successful login: the short-lived access token
/// and the longer-lived refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}
