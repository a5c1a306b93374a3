//! HTTP client for the Jewel API
//!
//! Every call goes through [`HttpClient::execute`], which implements the
//! authenticated mutation protocol:
//!
//! - mutating methods (POST, PUT, PATCH, DELETE) carry `x-csrf-token`; a
//!   token is fetched first when the session has none
//! - a 403 whose message mentions CSRF triggers one token refresh and one
//!   resend, never more
//! - a terminal auth failure clears the session and notifies the
//!   session-expired handler

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate,
    SubscribeRequest, Subscriber,
};
use shared::request::AdminProductQuery;
use shared::{ApiResponse, CsrfTokenData, Pagination};

use crate::config::SessionExpiredHandler;
use crate::{ClientConfig, ClientError, ClientResult, Session};

/// Header carrying the CSRF token on mutating requests
pub const CSRF_HEADER: &str = "x-csrf-token";

const CSRF_TOKEN_PATH: &str = "/api/auth/csrf-token";
const LOGIN_PATH: &str = "/api/auth/login";

/// One page of the admin product list
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub pagination: Pagination,
}

/// HTTP client bound to one [`Session`]
///
/// Cloning is cheap; clones share the session and the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
    on_session_expired: Option<SessionExpiredHandler>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let session = Arc::new(Session::new(&base_url)?);
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .cookie_provider(session.jar())
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            session,
            on_session_expired: config.on_session_expired.clone(),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetch a fresh CSRF token and store it in the session
    ///
    /// The server mirrors the token into the `csrfToken` cookie, which the
    /// cookie store picks up from the same response.
    pub async fn fetch_csrf_token(&self) -> ClientResult<String> {
        let response = self.client.get(self.url(CSRF_TOKEN_PATH)).send().await?;
        let token = Self::handle_response::<CsrfTokenData>(response)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing CSRF token".to_string()))?
            .csrf_token;
        self.session.set_csrf_token(token.clone());
        Ok(token)
    }

    /// Run one logical request through the mutation protocol
    pub async fn execute<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let result = self.dispatch(&method, path, query, body).await;

        if let Err(err) = &result
            && err.is_auth_failure()
            && path != LOGIN_PATH
        {
            tracing::warn!(path, error = %err, "Session expired, clearing");
            self.expire_session();
        }

        result
    }

    async fn dispatch<T, Q, B>(
        &self,
        method: &Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        if !is_mutating(method) {
            return self.send_once(method, path, query, body, None).await;
        }

        let token = match self.session.csrf_token() {
            Some(token) => token,
            None => self.fetch_csrf_token().await?,
        };

        match self.send_once(method, path, query, body, Some(&token)).await {
            Err(ClientError::Csrf(message)) => {
                tracing::debug!(%method, path, %message, "CSRF token rejected, refreshing");
                let token = self.fetch_csrf_token().await?;
                self.send_once(method, path, query, body, Some(&token)).await
            }
            other => other,
        }
    }

    async fn send_once<T, Q, B>(
        &self,
        method: &Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
        csrf_token: Option<&str>,
    ) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let mut request: RequestBuilder = self.client.request(method.clone(), self.url(path));
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }
        if let Some(token) = csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str::<ApiResponse<Value>>(&text).ok();
            return Err(ClientError::from_response(status, body));
        }

        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    fn expire_session(&self) {
        self.session.clear();
        if let Some(handler) = &self.on_session_expired {
            handler();
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        self.execute::<T, (), ()>(Method::GET, path, None, None).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<ApiResponse<T>> {
        self.execute::<T, (), B>(method, path, None, body).await
    }

    fn data<T>(response: ApiResponse<T>, what: &str) -> ClientResult<T> {
        response
            .data
            .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {what} data")))
    }

    // ========== Auth API ==========

    /// Login with username and password
    ///
    /// The session cookie is stored by the cookie jar; the user is recorded
    /// in the session.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let login = Self::data(
            self.send::<LoginResponse, _>(Method::POST, LOGIN_PATH, Some(&request))
                .await?,
            "login",
        )?;
        self.session.set_user(login.user.clone());
        Ok(login)
    }

    /// Logout; the local session is cleared whatever the server answers
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .send::<(), ()>(Method::POST, "/api/auth/logout", None)
            .await;
        self.session.clear();
        result.map(|_| ())
    }

    /// Get current user information
    pub async fn me(&self) -> ClientResult<UserInfo> {
        Self::data(self.get("/api/auth/me").await?, "user")
    }

    // ========== Product API ==========

    /// Storefront product list
    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        Self::data(self.get("/api/products").await?, "product")
    }

    /// Admin product list with server-side filters and pagination
    pub async fn admin_products(&self, query: &AdminProductQuery) -> ClientResult<ProductPage> {
        let response = self
            .execute::<Vec<Product>, _, ()>(Method::GET, "/api/products/admin/all", Some(query), None)
            .await?;
        let pagination = response
            .pagination
            .ok_or_else(|| ClientError::InvalidResponse("Missing pagination".to_string()))?;
        Ok(ProductPage {
            items: Self::data(response, "product")?,
            pagination,
        })
    }

    pub async fn get_product(&self, id: i64) -> ClientResult<Product> {
        Self::data(self.get(&format!("/api/products/{id}")).await?, "product")
    }

    pub async fn create_product(&self, payload: &ProductCreate) -> ClientResult<Product> {
        Self::data(
            self.send(Method::POST, "/api/products", Some(payload)).await?,
            "product",
        )
    }

    pub async fn update_product(&self, id: i64, payload: &ProductUpdate) -> ClientResult<Product> {
        Self::data(
            self.send(Method::PUT, &format!("/api/products/{id}"), Some(payload))
                .await?,
            "product",
        )
    }

    pub async fn delete_product(&self, id: i64) -> ClientResult<()> {
        self.send::<(), ()>(Method::DELETE, &format!("/api/products/{id}"), None)
            .await
            .map(|_| ())
    }

    // ========== Category API ==========

    pub async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        Self::data(self.get("/api/categories").await?, "category")
    }

    pub async fn get_category(&self, id: i64) -> ClientResult<Category> {
        Self::data(self.get(&format!("/api/categories/{id}")).await?, "category")
    }

    pub async fn create_category(&self, payload: &CategoryCreate) -> ClientResult<Category> {
        Self::data(
            self.send(Method::POST, "/api/categories", Some(payload))
                .await?,
            "category",
        )
    }

    pub async fn update_category(&self, id: i64, payload: &CategoryUpdate) -> ClientResult<Category> {
        Self::data(
            self.send(Method::PUT, &format!("/api/categories/{id}"), Some(payload))
                .await?,
            "category",
        )
    }

    pub async fn delete_category(&self, id: i64) -> ClientResult<()> {
        self.send::<(), ()>(Method::DELETE, &format!("/api/categories/{id}"), None)
            .await
            .map(|_| ())
    }

    // ========== Newsletter API ==========

    /// Public newsletter signup
    pub async fn subscribe(&self, email: &str) -> ClientResult<Subscriber> {
        let request = SubscribeRequest {
            email: email.to_string(),
        };
        Self::data(
            self.send(Method::POST, "/api/newsletter/subscribe", Some(&request))
                .await?,
            "subscriber",
        )
    }

    pub async fn subscribers(&self) -> ClientResult<Vec<Subscriber>> {
        Self::data(self.get("/api/newsletter/subscribers").await?, "subscriber")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutating_methods() {
        assert!(is_mutating(&Method::POST));
        assert!(is_mutating(&Method::PUT));
        assert!(is_mutating(&Method::PATCH));
        assert!(is_mutating(&Method::DELETE));
        assert!(!is_mutating(&Method::GET));
        assert!(!is_mutating(&Method::HEAD));
        assert!(!is_mutating(&Method::OPTIONS));
    }

    #[tokio::test]
    async fn test_unencodable_body_is_serialization_error() {
        use std::collections::HashMap;

        // Unreachable base URL: encoding must fail before any connection
        let client = HttpClient::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
        client.session().set_csrf_token("t");
        let body: HashMap<(i32, i32), i32> = HashMap::from([((1, 2), 3)]);

        let err = client
            .execute::<Value, (), _>(Method::POST, "/api/products", None, Some(&body))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Serialization(_)), "{err:?}");
        assert_eq!(client.session().csrf_token().as_deref(), Some("t"));
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = HttpClient::new(&ClientConfig::new("not a url")).unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_url_joining() {
        let client = HttpClient::new(&ClientConfig::new("http://127.0.0.1:3000/")).unwrap();
        assert_eq!(
            client.url("/api/products"),
            "http://127.0.0.1:3000/api/products"
        );
        assert_eq!(client.url("health"), "http://127.0.0.1:3000/health");
    }
}
