//! Newsletter API 模块
//!
//! 订阅接口面向公众，不要求登录也不校验 CSRF；订阅者列表仅管理员可见。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/newsletter", newsletter_routes())
}

fn newsletter_routes() -> Router<ServerState> {
    Router::new()
        .route("/subscribe", post(handler::subscribe))
        .route("/subscribers", get(handler::subscribers))
}
