use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Distinguishes the two token lifetimes handed out at login.
///
/// The kind is stamped into the claims so the strict refresh policy (see
/// `Config::refresh_tokens_authenticate`) can tell them apart; under the
/// default permissive policy it is informational only.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the account id in string form.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
    /// Which lifetime this token was issued with. Optional so tokens minted
    /// before the claim existed still verify.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TokenKind>,
}

/// Failure kinds from token verification.
///
/// All of them collapse to HTTP 401 at the boundary with distinct details
/// (see the `From<TokenError> for AppError` impl in `error.rs`); internally
/// they stay distinguishable for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The token's `exp` is in the past.
    Expired,
    /// Bad signature or broken structure.
    Malformed,
    /// Any other decode failure.
    Unknown,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::Malformed,
            _ => TokenError::Unknown,
        }
    }
}

/// Issues and verifies signed, time-limited bearer tokens.
///
/// Constructed once at startup from the configured secret and algorithm and
/// shared as `web::Data<TokenService>`; it holds no mutable state. The
/// service is TTL-agnostic: the caller supplies a duration, which is how the
/// short-lived access token and the longer-lived refresh token share one
/// implementation.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
        }
    }

    /// Issues a token for `subject` expiring `ttl` from now.
    pub fn issue(
        &self,
        subject: &str,
        ttl: chrono::Duration,
        kind: TokenKind,
    ) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal("token expiry out of range".into()))?
            .timestamp();

        let claims = Claims {
            sub: subject.to_string(),
            exp: expiration as usize,
            kind: Some(kind),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry, returning the decoded claims.
    ///
    /// Expiry is a strict comparison against wall-clock UTC; no leeway is
    /// applied.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn service() -> TokenService {
        TokenService::new("test_secret_for_tokens", Algorithm::HS256)
    }

    #[test]
    fn test_token_issuance_and_verification() {
        let token = service()
            .issue("42", Duration::minutes(30), TokenKind::Access)
            .unwrap();
        let claims = service().verify(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.kind, Some(TokenKind::Access));
        assert!(claims.exp > chrono::Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_already_expired_token_fails_with_expired() {
        let token = service()
            .issue("42", Duration::seconds(-1), TokenKind::Access)
            .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_foreign_secret_fails_with_malformed() {
        let foreign = TokenService::new("a_completely_different_secret", Algorithm::HS256);
        let token = foreign
            .issue("42", Duration::minutes(30), TokenKind::Access)
            .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_garbage_token_fails_with_malformed() {
        assert_eq!(
            service().verify("not.a.token"),
            Err(TokenError::Malformed)
        );
        assert_eq!(service().verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_refresh_kind_survives_round_trip() {
        let token = service()
            .issue("7", Duration::hours(24), TokenKind::Refresh)
            .unwrap();
        let claims = service().verify(&token).unwrap();

        assert_eq!(claims.kind, Some(TokenKind::Refresh));
    }
}
