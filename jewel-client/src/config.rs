//! Client configuration

use std::fmt;
use std::sync::Arc;

use crate::{ClientResult, HttpClient};

/// Callback invoked once the session is found to be gone (401 or an
/// auth-related failure). A UI would navigate to its login screen here.
pub type SessionExpiredHandler = Arc<dyn Fn() + Send + Sync>;

/// Client configuration for connecting to the Jewel server
#[derive(Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Called after the session has been cleared
    pub on_session_expired: Option<SessionExpiredHandler>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            on_session_expired: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the session-expired handler
    pub fn on_session_expired(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(handler));
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<HttpClient> {
        HttpClient::new(self)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("on_session_expired", &self.on_session_expired.is_some())
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
