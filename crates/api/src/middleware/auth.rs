//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use engagement_core::error::CoreError;
use engagement_core::roles::can_act_for_any_user;
use engagement_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Handlers that act on a `user_id` from the path or body must call
/// [`AuthUser::authorize_user`] before touching any data.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's user id (from `claims.sub`).
    pub user_id: DbId,
    /// The caller's role name (`"user"`, `"admin"`, `"service"`).
    pub role: String,
    /// The raw bearer token, forwarded to the comms service.
    pub token: String,
}

impl AuthUser {
    /// Allow the request to act on `target_user_id`.
    ///
    /// Passes for the user themselves and for admin or service callers.
    /// Fails with 403 before any lookup so the response never reveals
    /// whether the target exists.
    pub fn authorize_user(&self, target_user_id: DbId) -> Result<(), AppError> {
        if self.user_id == target_user_id || can_act_for_any_user(&self.role) {
            return Ok(());
        }
        tracing::warn!(
            caller = self.user_id,
            target = target_user_id,
            "Cross-user access rejected"
        );
        Err(AppError::Core(CoreError::Forbidden(
            "Unauthorized access to user data.".into(),
        )))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            token: token.to_string(),
        })
    }
}
