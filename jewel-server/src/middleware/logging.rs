//! 请求日志中间件
//!
//! 每个请求记录开始与结束两条日志。请求 ID 取自 `SetRequestIdLayer` 写入的
//! 扩展；操作者、错误码和 CSRF 拒绝原因由内层写入响应扩展，这里统一读取。

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::request_id::RequestId;
use tracing::{info, warn};

use crate::auth::{CsrfRejection, CurrentUser};
use crate::utils::ErrorCode;

/// 响应阶段可得的请求结果
#[derive(Debug, Clone, PartialEq)]
struct Outcome {
    status: u16,
    /// `username(id)`，未认证或在认证前被拒绝时为 `None`
    user: Option<String>,
    error_code: Option<ErrorCode>,
    csrf_reason: Option<&'static str>,
}

impl Outcome {
    fn from_response(response: &Response) -> Self {
        let ext = response.extensions();
        Self {
            status: response.status().as_u16(),
            user: ext
                .get::<CurrentUser>()
                .map(|u| format!("{}({})", u.username, u.id)),
            error_code: ext.get::<ErrorCode>().copied(),
            csrf_reason: ext.get::<CsrfRejection>().map(|r| r.0),
        }
    }
}

fn request_id(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// 请求日志中间件
///
/// 2xx/3xx 记 info；4xx 与 5xx 记 warn，并带上操作者与错误码，
/// 以便追查后台变更被 401/403/409 拒绝的原因。
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request_id(&req);
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    info!(request_id = %request_id, method = %method, path = %path, "Request started");

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();
    let outcome = Outcome::from_response(&response);

    if outcome.status >= 400 {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = outcome.status,
            latency_ms = %latency_ms,
            user = outcome.user.as_deref().unwrap_or("anonymous"),
            error_code = ?outcome.error_code,
            csrf_reason = outcome.csrf_reason,
            "Request rejected"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = outcome.status,
            latency_ms = %latency_ms,
            user = outcome.user.as_deref().unwrap_or("anonymous"),
            "Request completed"
        );
    }

    response
}
