//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::auth::AdminUser;
use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, JsonBody, PathParam, ok, ok_with_message};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

/// GET /api/categories - 获取所有分类
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    ok(category::find_all(&state.db.pool).await?)
}

/// GET /api/categories/:id - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = category::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ok(category)
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    admin: AdminUser,
    WithRejection(Json(payload), _): JsonBody<CategoryCreate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    payload.validate()?;

    let category = category::create(&state.db.pool, payload).await?;
    tracing::info!(category_id = category.id, by = %admin.username, "Category created");
    ok_with_message("Category created", category)
}

/// PUT /api/categories/:id - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    _admin: AdminUser,
    WithRejection(Path(id), _): PathParam<i64>,
    WithRejection(Json(payload), _): JsonBody<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    payload.validate()?;
    ok_with_message("Category updated", category::update(&state.db.pool, id, payload).await?)
}

/// DELETE /api/categories/:id - 删除分类 (仍有商品引用时返回 409)
pub async fn delete(
    State(state): State<ServerState>,
    admin: AdminUser,
    WithRejection(Path(id), _): PathParam<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !category::delete(&state.db.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(category_id = id, by = %admin.username, "Category deleted");
    Ok(Json(ApiResponse::ok("Category deleted")))
}
