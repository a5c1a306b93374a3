//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件以及会话 Cookie 的构造

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use http::Method;
use http::request::Parts;

use crate::AppError;
use crate::auth::{CSRF_COOKIE, CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 会话 Cookie 名称
pub const AUTH_COOKIE: &str = "authToken";

/// 认证中间件 - 要求用户登录
///
/// 优先从 `authToken` Cookie 读取 JWT，其次是 `Authorization: Bearer <token>` 头。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - 见 [`is_public_route`]
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无令牌 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_public_route(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match extract_token(&jar, header)? {
        Some(token) => token,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let user = authenticate(&state.jwt_service, &token, req.uri())?;
    req.extensions_mut().insert(user.clone());

    // 响应扩展中也放一份，供外层请求日志使用
    let mut response = next.run(req).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

/// 无需登录即可访问的路由
///
/// 店面只读接口、登录流程与公开表单提交。
pub fn is_public_route(method: &Method, path: &str) -> bool {
    if *method == Method::OPTIONS || !path.starts_with("/api/") {
        return true;
    }

    match path {
        "/api/auth/csrf-token" | "/api/auth/login" | "/api/auth/logout" => return true,
        "/api/newsletter/subscribe" => return *method == Method::POST,
        _ => {}
    }

    if *method == Method::GET {
        if path.starts_with("/api/products/admin") {
            return false;
        }
        return path == "/api/products"
            || path.starts_with("/api/products/")
            || path == "/api/categories"
            || path.starts_with("/api/categories/");
    }

    false
}

/// 从 Cookie 或 Authorization 头取出令牌
fn extract_token(jar: &CookieJar, header: Option<&str>) -> Result<Option<String>, AppError> {
    if let Some(cookie) = jar.get(AUTH_COOKIE).filter(|c| !c.value().is_empty()) {
        return Ok(Some(cookie.value().to_string()));
    }
    match header {
        Some(header) => JwtService::extract_from_header(header)
            .map(|t| Some(t.to_string()))
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header")),
        None => Ok(None),
    }
}

/// 验证令牌并构造当前用户
fn authenticate(
    jwt_service: &JwtService,
    token: &str,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    match jwt_service.validate_token(token) {
        Ok(claims) => CurrentUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e))),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", uri)
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 从请求头部解析当前用户 (供提取器使用)
pub(crate) fn user_from_parts(parts: &Parts, state: &ServerState) -> Result<CurrentUser, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match extract_token(&jar, header)? {
        Some(token) => authenticate(&state.jwt_service, &token, &parts.uri),
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
            Err(AppError::unauthorized())
        }
    }
}

fn same_site(production: bool) -> SameSite {
    if production {
        SameSite::Strict
    } else {
        SameSite::Lax
    }
}

/// 登录成功后下发的会话 Cookie (httpOnly)
pub fn auth_cookie(token: String, max_age_secs: i64, production: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(same_site(production))
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// 清除会话 Cookie
pub fn clear_auth_cookie(production: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(same_site(production))
        .max_age(time::Duration::ZERO)
        .build()
}

/// CSRF 令牌 Cookie (double-submit，需要被页面脚本读取，所以不是 httpOnly)
pub fn csrf_cookie(token: String, max_age_secs: i64, production: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .secure(production)
        .same_site(same_site(production))
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes() {
        assert!(is_public_route(&Method::GET, "/health"));
        assert!(is_public_route(&Method::OPTIONS, "/api/products"));
        assert!(is_public_route(&Method::GET, "/api/auth/csrf-token"));
        assert!(is_public_route(&Method::POST, "/api/auth/login"));
        assert!(is_public_route(&Method::POST, "/api/auth/logout"));
        assert!(is_public_route(&Method::GET, "/api/products"));
        assert!(is_public_route(&Method::GET, "/api/products/12"));
        assert!(is_public_route(&Method::GET, "/api/categories"));
        assert!(is_public_route(&Method::POST, "/api/newsletter/subscribe"));
    }

    #[test]
    fn test_protected_routes() {
        assert!(!is_public_route(&Method::GET, "/api/auth/me"));
        assert!(!is_public_route(&Method::GET, "/api/products/admin/all"));
        assert!(!is_public_route(&Method::POST, "/api/products"));
        assert!(!is_public_route(&Method::PUT, "/api/products/1"));
        assert!(!is_public_route(&Method::DELETE, "/api/categories/1"));
        assert!(!is_public_route(&Method::GET, "/api/newsletter/subscribers"));
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let dev = auth_cookie("t".into(), 60, false);
        assert_eq!(dev.name(), AUTH_COOKIE);
        assert_eq!(dev.http_only(), Some(true));
        assert_eq!(dev.same_site(), Some(SameSite::Lax));
        assert_ne!(dev.secure(), Some(true));
        assert_eq!(dev.max_age(), Some(time::Duration::seconds(60)));

        let prod = auth_cookie("t".into(), 60, true);
        assert_eq!(prod.same_site(), Some(SameSite::Strict));
        assert_eq!(prod.secure(), Some(true));

        let cleared = clear_auth_cookie(false);
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn test_token_prefers_cookie() {
        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, "from-cookie"));
        let token = extract_token(&jar, Some("Bearer from-header")).unwrap();
        assert_eq!(token.as_deref(), Some("from-cookie"));

        let token = extract_token(&CookieJar::new(), Some("Bearer from-header")).unwrap();
        assert_eq!(token.as_deref(), Some("from-header"));

        assert!(extract_token(&CookieJar::new(), Some("Basic abc")).is_err());
        assert!(extract_token(&CookieJar::new(), None).unwrap().is_none());
    }
}
