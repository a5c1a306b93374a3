//! Jewel Server - 珠宝电商后台服务
//!
//! # 架构概述
//!
//! - **数据库** (`db`): SQLite (sqlx)，内嵌迁移
//! - **认证** (`auth`): JWT 会话 Cookie + Argon2 + CSRF double-submit
//! - **HTTP API** (`api`): 商品、分类、邮件订阅的 RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! jewel-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── auth/          # JWT、CSRF、密码、提取器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池与仓储
//! ├── middleware/    # 请求日志
//! ├── routes/        # 路由与中间件组装
//! └── utils/         # 日志初始化、响应辅助
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod middleware;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{AdminUser, CsrfService, CurrentUser, JwtService};
pub use core::{Config, Server, ServerError, ServerState};
pub use routes::{build_app, build_router};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 加载 `.env`，初始化日志
///
/// 日志写入 `WORK_DIR/logs`；开发环境同时输出到控制台。
pub fn setup_environment() -> Result<Config, ServerError> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    if config.is_development() {
        init_logger_with_file(Some(&config.log_level), false, None);
    } else {
        let log_dir = config.log_dir();
        init_logger_with_file(Some(&config.log_level), true, Some(&log_dir));
    }

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
       __                    __
      / /__ _      _____  / /
 __  / / _ \ | /| / / _ \/ /
/ /_/ /  __/ |/ |/ /  __/ /
\____/\___/|__/|__/\___/_/
    "#
    );
}
