//! Client session
//!
//! Holds everything the mutation protocol needs between requests: the cookie
//! jar (carrying the httpOnly `authToken` and the `csrfToken` cookie), the
//! CSRF token to echo in `x-csrf-token`, and the logged-in user.
//!
//! A session is owned by one [`crate::HttpClient`] and its clones; there is
//! no process-wide token.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Url;
use reqwest::cookie::Jar;
use shared::client::UserInfo;

use crate::{ClientError, ClientResult};

const AUTH_COOKIE: &str = "authToken";
const CSRF_COOKIE: &str = "csrfToken";

#[derive(Debug)]
pub struct Session {
    jar: Arc<Jar>,
    origin: Url,
    csrf_token: RwLock<Option<String>>,
    user: RwLock<Option<UserInfo>>,
}

impl Session {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let origin = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("Invalid base URL {base_url}: {e}")))?;
        Ok(Self {
            jar: Arc::new(Jar::default()),
            origin,
            csrf_token: RwLock::new(None),
            user: RwLock::new(None),
        })
    }

    /// Cookie store shared with the underlying reqwest client
    pub fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token.read().clone()
    }

    pub fn set_csrf_token(&self, token: impl Into<String>) {
        *self.csrf_token.write() = Some(token.into());
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.user.read().clone()
    }

    pub fn set_user(&self, user: UserInfo) {
        *self.user.write() = Some(user);
    }

    /// Whether a login has been recorded and not yet cleared
    pub fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }

    /// Forget the user, the CSRF token and both cookies
    pub fn clear(&self) {
        *self.csrf_token.write() = None;
        *self.user.write() = None;
        for name in [AUTH_COOKIE, CSRF_COOKIE] {
            self.jar
                .add_cookie_str(&format!("{name}=; Max-Age=0; Path=/"), &self.origin);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    fn user() -> UserInfo {
        UserInfo {
            id: 1,
            username: "curator".into(),
            role: "admin".into(),
            is_active: true,
            created_at: 0,
        }
    }

    #[test]
    fn test_clear_resets_everything() {
        let session = Session::new("http://127.0.0.1:3000").unwrap();
        let url = Url::parse("http://127.0.0.1:3000/api/products").unwrap();
        session
            .jar()
            .add_cookie_str("authToken=abc; Path=/", &url);
        session.set_csrf_token("t");
        session.set_user(user());
        assert!(session.is_authenticated());
        assert!(session.jar().cookies(&url).is_some());

        session.clear();

        assert!(session.csrf_token().is_none());
        assert!(!session.is_authenticated());
        assert!(session.jar().cookies(&url).is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            Session::new("not a url"),
            Err(ClientError::Config(_))
        ));
    }
}
