//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`ApiResponse`] - API 响应结构 (from shared::response)
//! - 日志初始化

pub mod logger;

pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use shared::response::{ApiResponse, Pagination};

use axum::Json;
use axum::extract::{Path, Query};
use axum_extra::extract::WithRejection;

/// JSON 请求体; 解析失败时返回统一错误信封
pub type JsonBody<T> = WithRejection<Json<T>, AppError>;

/// 查询参数; 解析失败时返回统一错误信封
pub type QueryParams<T> = WithRejection<Query<T>, AppError>;

/// 路径参数; 解析失败时返回统一错误信封
pub type PathParam<T> = WithRejection<Path<T>, AppError>;

/// 成功响应
pub fn ok<T>(data: T) -> AppResult<Json<ApiResponse<T>>> {
    Ok(Json(ApiResponse::success(data)))
}

/// 带消息的成功响应
pub fn ok_with_message<T>(message: impl Into<String>, data: T) -> AppResult<Json<ApiResponse<T>>> {
    Ok(Json(ApiResponse::success_with_message(message, data)))
}
