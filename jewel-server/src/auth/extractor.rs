//! JWT Extractor
//!
//! Custom extractors for automatically validating the session token

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::ErrorCode;

use crate::AppError;
use crate::auth::middleware::user_from_parts;
use crate::auth::{AdminUser, CurrentUser};
use crate::core::ServerState;
use crate::security_log;

/// JWT Auth Extractor
///
/// Use this extractor in protected handlers to automatically validate the
/// session token and extract CurrentUser
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = user_from_parts(parts, state)?;

        // Store in extensions for potential reuse
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Admin extractor
///
/// Rejects authenticated non-admin users with 403
impl FromRequestParts<ServerState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            security_log!(
                "WARN",
                "admin_required",
                user_id = user.id,
                username = user.username.clone(),
                user_role = user.role.clone()
            );
            return Err(AppError::new(ErrorCode::AdminRequired));
        }
        Ok(AdminUser(user))
    }
}
