//! Auth API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/auth/csrf-token | GET | 签发 CSRF 令牌 |
//! | /api/auth/login | POST | 登录，下发 `authToken` Cookie |
//! | /api/auth/logout | POST | 清除会话 Cookie |
//! | /api/auth/me | GET | 当前用户 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", auth_routes())
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/csrf-token", get(handler::csrf_token))
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/me", get(handler::me))
}
