//! 认证授权模块
//!
//! 提供 JWT 会话、CSRF 防护和中间件：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CsrfService`] - CSRF 令牌签发与校验
//! - [`CurrentUser`] / [`AdminUser`] - 当前用户上下文
//! - [`require_auth`] - 认证中间件
//! - [`require_csrf`] - CSRF 中间件

pub mod csrf;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use csrf::{CSRF_COOKIE, CSRF_HEADER, CsrfConfig, CsrfError, CsrfRejection, CsrfService, is_csrf_exempt, require_csrf};
pub use jwt::{AdminUser, Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{AUTH_COOKIE, auth_cookie, clear_auth_cookie, csrf_cookie, is_public_route, require_auth};
pub use password::{hash_password, verify_password};
