//! Newsletter API Handlers

use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::auth::AdminUser;
use crate::core::ServerState;
use crate::db::repository::subscriber;
use crate::utils::{ApiResponse, AppResult, JsonBody, ok, ok_with_message};
use shared::models::{SubscribeRequest, Subscriber};

/// POST /api/newsletter/subscribe - 公开订阅
pub async fn subscribe(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<SubscribeRequest>,
) -> AppResult<Json<ApiResponse<Subscriber>>> {
    payload.validate()?;
    let subscriber = subscriber::subscribe(&state.db.pool, &payload.email).await?;
    ok_with_message("Subscribed", subscriber)
}

/// GET /api/newsletter/subscribers - 订阅者列表
pub async fn subscribers(
    State(state): State<ServerState>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<Vec<Subscriber>>>> {
    ok(subscriber::find_all(&state.db.pool).await?)
}
