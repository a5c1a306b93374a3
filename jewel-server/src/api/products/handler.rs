//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::auth::AdminUser;
use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::{
    ApiResponse, AppError, AppResult, ErrorCode, JsonBody, Pagination, PathParam, QueryParams, ok,
    ok_with_message,
};
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::request::AdminProductQuery;

/// GET /api/products - 店面商品列表 (仅上架商品)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = product::find_public(&state.db.pool).await?;
    ok(products)
}

/// GET /api/products/admin/all - 后台分页列表
///
/// 搜索、分类、状态和分页在服务端完成；其余筛选与排序由客户端在当前页上计算。
pub async fn admin_list(
    State(state): State<ServerState>,
    _admin: AdminUser,
    WithRejection(Query(query), _): QueryParams<AdminProductQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let (products, total) = product::find_page(&state.db.pool, &query).await?;
    let pagination = Pagination::new(query.page(), query.limit(), total);
    Ok(Json(ApiResponse::paginated(products, pagination)))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found")))?;
    ok(product)
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    admin: AdminUser,
    WithRejection(Json(payload), _): JsonBody<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    payload.validate()?;

    let product = product::create(&state.db.pool, payload).await?;
    tracing::info!(product_id = product.id, code = %product.code, by = %admin.username, "Product created");
    ok_with_message("Product created", product)
}

/// PUT /api/products/:id - 部分更新商品
pub async fn update(
    State(state): State<ServerState>,
    admin: AdminUser,
    WithRejection(Path(id), _): PathParam<i64>,
    WithRejection(Json(payload), _): JsonBody<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    payload.validate()?;

    let product = product::update(&state.db.pool, id, payload).await?;
    tracing::info!(product_id = id, by = %admin.username, "Product updated");
    ok_with_message("Product updated", product)
}

/// DELETE /api/products/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    admin: AdminUser,
    WithRejection(Path(id), _): PathParam<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !product::delete(&state.db.pool, id).await? {
        return Err(AppError::with_message(
            ErrorCode::ProductNotFound,
            format!("Product {id} not found"),
        ));
    }
    tracing::info!(product_id = id, by = %admin.username, "Product deleted");
    Ok(Json(ApiResponse::ok("Product deleted")))
}
