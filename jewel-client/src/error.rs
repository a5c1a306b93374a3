//! Client error types

use std::collections::HashMap;

use http::StatusCode;
use serde_json::Value;
use shared::{ApiResponse, ErrorCode};
use thiserror::Error;

/// Phrases that mark a failure as an authentication problem even when the
/// status code is not 401
const AUTH_PHRASES: &[&str] = &["unauthorized", "authentication", "token expired", "invalid token"];

/// Client error type
///
/// Every variant renders into the uniform `{success: false, message, error}`
/// failure shape via [`ClientError::to_failure`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response that fits no narrower variant
    #[error("{message}")]
    Http {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },

    /// Request rejected by server-side validation
    #[error("{message}")]
    Validation {
        message: String,
        fields: HashMap<String, Vec<String>>,
    },

    /// Session missing, expired or invalid
    #[error("{0}")]
    Unauthorized(String),

    /// CSRF rejection that survived the single retry
    #[error("{0}")]
    Csrf(String),

    /// 2xx response whose body is not the expected envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request body or query could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Client misconfigured (bad base URL, HTTP client build failure)
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a non-2xx response
    ///
    /// `body` is the decoded failure envelope when the server sent one.
    pub fn from_response(status: StatusCode, body: Option<ApiResponse<Value>>) -> Self {
        let code = body.as_ref().and_then(|b| b.error_code());
        let message = body
            .as_ref()
            .and_then(|b| b.message.clone().or_else(|| b.error.clone()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        if status == StatusCode::FORBIDDEN && message.contains("CSRF") {
            return Self::Csrf(message);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Self::Unauthorized(message);
        }

        let fields = body
            .as_ref()
            .and_then(|b| b.details.as_ref())
            .and_then(|d| d.get("fields"))
            .map(parse_fields);
        if status == StatusCode::BAD_REQUEST
            && (code == Some(ErrorCode::ValidationFailed) || fields.is_some())
        {
            return Self::Validation {
                message,
                fields: fields.unwrap_or_default(),
            };
        }

        Self::Http {
            status: status.as_u16(),
            code,
            message,
        }
    }

    /// Short machine-readable kind, used as the `error` field of the failure shape
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::Validation { .. } => "validation",
            Self::Unauthorized(_) => "unauthorized",
            Self::Csrf(_) => "csrf",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Validation { .. } => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Csrf(_) => Some(403),
            _ => None,
        }
    }

    /// Whether this failure means the session is gone
    ///
    /// True for 401 responses and for any failure whose message mentions an
    /// authentication problem.
    pub fn is_auth_failure(&self) -> bool {
        if matches!(self, Self::Unauthorized(_)) {
            return true;
        }
        let message = self.to_string().to_lowercase();
        AUTH_PHRASES.iter().any(|phrase| message.contains(phrase))
    }

    /// Render as the uniform failure envelope for toast-style display
    pub fn to_failure(&self) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            message: Some(self.to_string()),
            data: None,
            pagination: None,
            error: Some(self.kind().to_string()),
            code: match self {
                Self::Http { code, .. } => code.map(|c| c.code()),
                _ => None,
            },
            details: None,
        }
    }
}

fn parse_fields(value: &Value) -> HashMap<String, Vec<String>> {
    value
        .as_object()
        .map(|obj| {
            obj.iter()
                .map(|(field, messages)| {
                    let messages = match messages {
                        Value::Array(items) => items
                            .iter()
                            .filter_map(|m| m.as_str().map(str::to_string))
                            .collect(),
                        Value::String(s) => vec![s.clone()],
                        _ => Vec::new(),
                    };
                    (field.clone(), messages)
                })
                .collect()
        })
        .unwrap_or_default()
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Network(format!("Request timed out: {err}"))
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            // The base URL is checked up front, so what's left is encoding
            ClientError::Serialization(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
