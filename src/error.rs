use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::auth::Realm;

/// AppError
///
/// The application-wide error taxonomy. Every fallible handler and the identity
/// extractors return this type; the `IntoResponse` implementation below is the
/// single place where an error becomes an HTTP response.
///
/// `Authentication` and `Authorization` are distinct variants for logging, but
/// deliberately map to byte-identical responses: a caller probing an admin route
/// cannot tell a missing session from a wrong-realm session.
#[derive(Debug, Error)]
pub enum AppError {
    /// No valid session in the required realm (missing, malformed, or expired token).
    #[error("authentication required for the {0} realm")]
    Authentication(Realm),
    /// A valid session, but bound to the wrong realm for this route.
    #[error("session belongs to a realm other than {0}")]
    Authorization(Realm),
    /// Login attempt with an unknown email or a non-matching password.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// Required field missing or empty on create/update. Nothing was persisted.
    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),
    /// Unique-email collision on user creation. Nothing was persisted.
    #[error("email is already taken")]
    EmailTaken,
    /// The identifier in an update/delete/show request resolved to no row.
    #[error("resource not found")]
    NotFound,
    /// Underlying persistence failure. Logged in full, surfaced opaquely.
    #[error("database failure")]
    Database(#[from] sqlx::Error),
    /// Password hashing or hash parsing failed.
    #[error("password hashing failure")]
    PasswordHash,
    /// Session token could not be signed.
    #[error("token issuance failure")]
    TokenIssuance,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Both guard failures redirect to the realm's login endpoint with no
            // body. The two arms must stay identical so realms cannot be probed.
            AppError::Authentication(realm) => Redirect::to(realm.login_path()).into_response(),
            AppError::Authorization(realm) => Redirect::to(realm.login_path()).into_response(),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid email or password" })),
            )
                .into_response(),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation failed",
                    "fields": errors,
                })),
            )
                .into_response(),
            AppError::EmailTaken => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation failed",
                    "fields": { "email": ["email is already taken"] },
                })),
            )
                .into_response(),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "resource not found" })),
            )
                .into_response(),
            AppError::Database(e) => {
                // The caller gets an opaque message; the details go to the log.
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
            AppError::PasswordHash | AppError::TokenIssuance => {
                tracing::error!("credential machinery failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
