//! CSRF 令牌服务 (double-submit)
//!
//! `GET /api/auth/csrf-token` 签发令牌并写入 `csrfToken` Cookie；变更类请求
//! 必须在 `x-csrf-token` 头中携带同一个值。
//!
//! 令牌格式: `<issued_at_ms>.<nonce_hex>.<hmac_sha256_hex>`，签名覆盖前两段。
//! 令牌与会话无关，只校验签名、时效以及头与 Cookie 是否一致。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use http::Method;
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

use crate::AppError;
use crate::core::ServerState;
use crate::security_log;
use shared::ErrorCode;

/// CSRF 请求头
pub const CSRF_HEADER: &str = "x-csrf-token";
/// CSRF Cookie 名称
pub const CSRF_COOKIE: &str = "csrfToken";

/// 免校验的路径前缀
///
/// 登录流程、健康检查以及面向公众的表单提交不要求 CSRF 令牌。
const EXEMPT_PREFIXES: &[&str] = &[
    "/api/auth/",
    "/health",
    "/api/newsletter",
    "/api/distributors",
    "/api/inquiries",
];

/// CSRF 配置
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// HMAC 密钥
    pub secret: Vec<u8>,
    /// 令牌有效期 (秒)
    pub ttl_secs: u64,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        let secret = std::env::var("CSRF_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(String::into_bytes)
            .unwrap_or_else(random_secret);

        Self {
            secret,
            ttl_secs: std::env::var("CSRF_TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
        }
    }
}

/// 进程级随机密钥 (重启后旧令牌失效)
fn random_secret() -> Vec<u8> {
    let mut key = vec![0u8; 32];
    if SystemRandom::new().fill(&mut key).is_err() {
        tracing::warn!("Failed to generate random CSRF secret, falling back to time-derived key");
        key = shared::util::now_millis().to_be_bytes().repeat(4);
    }
    key
}

/// CSRF 校验错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CsrfError {
    #[error("令牌缺失")]
    Missing,

    #[error("请求头与 Cookie 不一致")]
    Mismatch,

    #[error("令牌格式错误")]
    Malformed,

    #[error("签名无效")]
    BadSignature,

    #[error("令牌已过期")]
    Expired,

    #[error("随机数生成失败")]
    Rng,
}

impl CsrfError {
    /// 用于日志与错误详情的简短原因
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Mismatch => "mismatch",
            Self::Malformed => "malformed",
            Self::BadSignature => "signature",
            Self::Expired => "expired",
            Self::Rng => "rng",
        }
    }
}

impl From<CsrfError> for AppError {
    fn from(err: CsrfError) -> Self {
        match err {
            CsrfError::Rng => AppError::internal("Failed to issue CSRF token"),
            CsrfError::Missing => AppError::csrf(ErrorCode::CsrfTokenMissing),
            other => AppError::csrf(ErrorCode::CsrfTokenInvalid).with_detail("reason", other.reason()),
        }
    }
}

/// CSRF 令牌服务
pub struct CsrfService {
    key: hmac::Key,
    ttl_ms: i64,
    rng: SystemRandom,
}

impl std::fmt::Debug for CsrfService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfService")
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}

impl CsrfService {
    pub fn new(config: &CsrfConfig) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, &config.secret),
            ttl_ms: i64::try_from(config.ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX),
            rng: SystemRandom::new(),
        }
    }

    /// 签发新令牌
    pub fn issue(&self) -> Result<String, CsrfError> {
        self.issue_at(shared::util::now_millis())
    }

    fn issue_at(&self, issued_at: i64) -> Result<String, CsrfError> {
        let mut nonce = [0u8; 16];
        self.rng.fill(&mut nonce).map_err(|_| CsrfError::Rng)?;

        let payload = format!("{}.{}", issued_at, hex::encode(nonce));
        let tag = hmac::sign(&self.key, payload.as_bytes());
        Ok(format!("{}.{}", payload, hex::encode(tag.as_ref())))
    }

    /// 校验令牌签名与时效
    pub fn verify(&self, token: &str) -> Result<(), CsrfError> {
        self.verify_at(token, shared::util::now_millis())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<(), CsrfError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(CsrfError::Malformed)?;
        let (issued_at, nonce) = payload.split_once('.').ok_or(CsrfError::Malformed)?;

        let issued_at: i64 = issued_at.parse().map_err(|_| CsrfError::Malformed)?;
        if nonce.is_empty() || hex::decode(nonce).is_err() {
            return Err(CsrfError::Malformed);
        }
        let signature = hex::decode(signature).map_err(|_| CsrfError::Malformed)?;

        hmac::verify(&self.key, payload.as_bytes(), &signature)
            .map_err(|_| CsrfError::BadSignature)?;

        if now.saturating_sub(issued_at) > self.ttl_ms {
            return Err(CsrfError::Expired);
        }
        Ok(())
    }

    /// 校验一次请求: 头必须存在、与 Cookie 相同、且本身有效
    pub fn check_request(&self, header: Option<&str>, cookie: Option<&str>) -> Result<(), CsrfError> {
        let header = header.filter(|h| !h.is_empty()).ok_or(CsrfError::Missing)?;
        match cookie {
            Some(cookie) if cookie == header => self.verify(header),
            _ => Err(CsrfError::Mismatch),
        }
    }
}

/// 请求是否免于 CSRF 校验
///
/// 安全方法 (GET/HEAD/OPTIONS) 全部放行；其余方法按路径前缀放行。
pub fn is_csrf_exempt(method: &Method, path: &str) -> bool {
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return true;
    }
    EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// CSRF 拒绝原因 (见 [`CsrfError::reason`])，写入响应扩展供请求日志使用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrfRejection(pub &'static str);

/// CSRF 中间件
///
/// 对非免检请求要求 `x-csrf-token` 头等于 `csrfToken` Cookie，且签名与时效有效。
/// 失败返回 403，消息包含 `CSRF`，客户端据此刷新令牌并重试一次。
pub async fn require_csrf(
    State(state): State<ServerState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_csrf_exempt(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|h| h.to_str().ok());
    let cookie = jar.get(CSRF_COOKIE).map(|c| c.value());

    if let Err(e) = state.csrf.check_request(header, cookie) {
        let reason = e.reason();
        security_log!(
            "WARN",
            "csrf_rejected",
            reason = reason,
            method = req.method().to_string(),
            uri = format!("{:?}", req.uri())
        );
        let mut response = AppError::from(e).into_response();
        response.extensions_mut().insert(CsrfRejection(reason));
        return Ok(response);
    }

    Ok(next.run(req).await)
}
