use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    config::AppConfig,
    error::AppError,
    repository::RepositoryState,
};

/// Lifetime of an issued session token.
pub const SESSION_TTL_SECS: u64 = 60 * 60 * 12;

/// Realm
///
/// An independent authentication namespace. End-users and administrators have
/// separate credential tables (`users` / `admins`) and separate session scopes;
/// a token minted for one realm is never honored by the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Realm {
    Web,
    Admin,
}

impl Realm {
    /// The login endpoint a guard failure for this realm redirects to.
    pub fn login_path(&self) -> &'static str {
        match self {
            Realm::Web => "/login",
            Realm::Admin => "/admin/login",
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Realm::Web => write!(f, "web"),
            Realm::Admin => write!(f, "admin"),
        }
    }
}

/// Claims
///
/// The payload signed into every session token. The realm claim is what keeps
/// the two credential namespaces disjoint: validation checks it against the
/// realm the route requires, not just the signature and expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: row id in the realm's credential table.
    pub sub: i64,
    /// The realm this session was minted for.
    pub realm: Realm,
    /// Expiration time (seconds since epoch). Always validated.
    pub exp: usize,
    /// Issued-at time (seconds since epoch).
    pub iat: usize,
}

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// issue_token
///
/// Mints a realm-scoped session token for a successfully authenticated caller.
pub fn issue_token(subject: i64, realm: Realm, config: &AppConfig) -> Result<String, AppError> {
    let now = unix_now();
    let claims = Claims {
        sub: subject,
        realm,
        exp: now + SESSION_TTL_SECS as usize,
        iat: now,
    };
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|_| AppError::TokenIssuance)
}

/// verify_token
///
/// Validates a raw token against the expected realm. Signature/expiry failures
/// are authentication errors; a wrong realm claim is an authorization error.
/// Both map to the same HTTP response, the distinction exists for logging.
pub fn verify_token(token: &str, expected: Realm, config: &AppConfig) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data =
        decode::<Claims>(token, &key, &validation).map_err(|_| AppError::Authentication(expected))?;

    if data.claims.realm != expected {
        return Err(AppError::Authorization(expected));
    }
    Ok(data.claims)
}

/// Pulls the bearer token out of the Authorization header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Shared front half of both identity extractors: header -> verified claims.
fn claims_from_parts(
    parts: &Parts,
    config: &AppConfig,
    expected: Realm,
) -> Result<Claims, AppError> {
    let token = bearer_token(&parts.headers).ok_or(AppError::Authentication(expected))?;
    verify_token(token, expected, config)
}

/// AdminIdentity
///
/// The resolved identity of an administrator request. Usable as a handler
/// argument (injected identity, no ambient lookup) and as the extractor behind
/// the `/admin` guard middleware, so the check runs before any controller logic.
///
/// Resolution re-verifies the subject against the `admins` table on every
/// request: deleting an admin invalidates outstanding tokens immediately.
///
/// Rejection: `AppError::Authentication` / `AppError::Authorization`, both of
/// which render as a redirect to `/admin/login`.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub id: i64,
    pub email: String,
}

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let claims = claims_from_parts(parts, &config, Realm::Admin)?;

        // A token can outlive its account; the row lookup is the final word.
        let admin = repo
            .find_admin(claims.sub)
            .await?
            .ok_or(AppError::Authentication(Realm::Admin))?;

        Ok(AdminIdentity {
            id: admin.id,
            email: admin.email,
        })
    }
}

/// WebIdentity
///
/// The resolved identity of an authenticated end-user request, mirroring
/// `AdminIdentity` for the "web" realm. An admin-realm token presented to a
/// web-realm route is rejected the same way a missing token is.
#[derive(Debug, Clone)]
pub struct WebIdentity {
    pub id: i64,
    pub email: String,
}

impl<S> FromRequestParts<S> for WebIdentity
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let claims = claims_from_parts(parts, &config, Realm::Web)?;

        let user = repo
            .find_user(claims.sub)
            .await?
            .ok_or(AppError::Authentication(Realm::Web))?;

        Ok(WebIdentity {
            id: user.id,
            email: user.email,
        })
    }
}

// --- Password Hashing ---

/// Hashes a plaintext password with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::PasswordHash)
}

/// Verifies a plaintext password against a stored argon2 hash.
///
/// An unparsable stored hash is an error; a clean mismatch is `Ok(false)`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AppError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
