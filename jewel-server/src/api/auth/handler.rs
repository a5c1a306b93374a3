//! Authentication Handlers
//!
//! Handles CSRF token issuance, login, logout and the current-user lookup

use std::time::Duration;

use axum::{Json, extract::State};
use axum_extra::extract::{CookieJar, WithRejection};

use crate::AppError;
use crate::auth::{CurrentUser, auth_cookie, clear_auth_cookie, csrf_cookie, verify_password};
use crate::core::ServerState;
use crate::utils::JsonBody;
use crate::db::repository::admin_user;
use crate::security_log;
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::util::now_millis;
use shared::{ApiResponse, CsrfTokenData, ErrorCode};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 250;

/// GET /api/auth/csrf-token - issue a token and mirror it into the cookie
pub async fn csrf_token(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<CsrfTokenData>>), AppError> {
    let token = state.csrf.issue()?;
    let max_age = i64::try_from(state.config.csrf.ttl_secs).unwrap_or(i64::MAX);
    let jar = jar.add(csrf_cookie(token.clone(), max_age, state.is_production()));

    Ok((jar, Json(ApiResponse::success(CsrfTokenData { csrf_token: token }))))
}

/// POST /api/auth/login
///
/// Verifies the argon2 hash and sets the httpOnly `authToken` cookie. The
/// token itself never appears in the body.
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    WithRejection(Json(req), _): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), AppError> {
    let user = admin_user::find_by_username(&state.db.pool, &req.username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        _ => {
            security_log!("WARN", "login_failed", username = req.username.clone());
            return Err(AppError::invalid_credentials());
        }
    };

    if !user.is_active {
        security_log!("WARN", "login_disabled", username = user.username.clone());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(user.id, &user.username, &user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    let max_age = jwt_service.expiration_seconds();
    let jar = jar.add(auth_cookie(token, max_age, state.is_production()));

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    let response = LoginResponse {
        expires_at: now_millis() + max_age * 1000,
        user: UserInfo::from(user),
    };
    Ok((jar, Json(ApiResponse::success_with_message("Login successful", response))))
}

/// POST /api/auth/logout - clear the session cookie
pub async fn logout(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    let jar = jar.add(clear_auth_cookie(state.is_production()));
    (jar, Json(ApiResponse::ok("Logged out")))
}

/// GET /api/auth/me - current user profile
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<UserInfo>>, AppError> {
    let row = admin_user::find_by_id(&state.db.pool, user.id)
        .await?
        .filter(|row| row.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::SessionExpired))?;

    Ok(Json(ApiResponse::success(UserInfo::from(row))))
}
