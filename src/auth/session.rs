/// Session token generation and validation
///
/// Login establishes a session by setting an HTTP-only cookie holding a
/// signed token (HS256 via jsonwebtoken). The token carries only the user
/// ID; the signed-in user is re-loaded from the database on every request,
/// so a deleted account cannot keep an open session alive.
///
/// # Example
///
/// ```
/// use tasklist::auth::session::{create_session_token, validate_session_token, SessionClaims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let user_id = Uuid::new_v4();
///
/// let token = create_session_token(&SessionClaims::new(user_id), secret)?;
/// let claims = validate_session_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```
use axum_extra::extract::cookie::Cookie;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "tasklist_session";

/// Issuer embedded in every session token
const ISSUER: &str = "tasklist";

/// Session lifetime
const SESSION_TTL_DAYS: i64 = 14;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token failed validation (bad signature, malformed, wrong issuer)
    #[error("Invalid session token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "tasklist"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims for a freshly signed-in user
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        }
    }
}

/// Signs session claims into a token string
///
/// # Errors
///
/// Returns `SessionError::CreateError` if encoding fails.
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionError::CreateError(e.to_string()))
}

/// Validates a session token and returns its claims
///
/// Checks signature, expiration, and issuer.
///
/// # Errors
///
/// Returns `SessionError::Expired` for an expired token and
/// `SessionError::ValidationError` for anything else invalid.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}

/// Builds the HTTP-only cookie carrying a session token
pub fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie
}

/// Builds the removal cookie that ends a session
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_session_token_round_trip() {
        let user_id = Uuid::new_v4();
        let claims = SessionClaims::new(user_id);

        let token = create_session_token(&claims, SECRET).expect("Create should succeed");
        let validated = validate_session_token(&token, SECRET).expect("Validate should succeed");

        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.iss, "tasklist");
    }

    #[test]
    fn test_session_token_wrong_secret_rejected() {
        let claims = SessionClaims::new(Uuid::new_v4());
        let token = create_session_token(&claims, SECRET).expect("Create should succeed");

        let result = validate_session_token(&token, "another-secret-key-32-bytes-long!!");
        assert!(matches!(result, Err(SessionError::ValidationError(_))));
    }

    #[test]
    fn test_session_token_expired_rejected() {
        let mut claims = SessionClaims::new(Uuid::new_v4());
        claims.iat = (Utc::now() - Duration::days(30)).timestamp();
        claims.exp = (Utc::now() - Duration::days(16)).timestamp();

        let token = create_session_token(&claims, SECRET).expect("Create should succeed");

        let result = validate_session_token(&token, SECRET);
        assert!(matches!(result, Err(SessionError::Expired)));
    }

    #[test]
    fn test_session_token_garbage_rejected() {
        let result = validate_session_token("not-a-token", SECRET);
        assert!(matches!(result, Err(SessionError::ValidationError(_))));
    }

    #[test]
    fn test_claims_expiration_is_in_the_future() {
        let claims = SessionClaims::new(Uuid::new_v4());
        assert!(claims.exp > claims.iat);
    }
}
