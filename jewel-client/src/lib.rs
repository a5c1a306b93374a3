//! Jewel Client - HTTP client for the Jewel back-office API
//!
//! Wraps the REST API with an explicit [`Session`] (cookie jar, CSRF token,
//! current user) and the authenticated mutation protocol, plus the admin
//! product list view that decides between re-fetching and local filtering.

pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod view;

pub use config::{ClientConfig, SessionExpiredHandler};
pub use error::{ClientError, ClientResult};
pub use http::{CSRF_HEADER, HttpClient, ProductPage};
pub use session::Session;
pub use view::ProductListView;

// Re-export shared types for convenience
pub use shared::client::{LoginResponse, UserInfo};
pub use shared::{ApiResponse, FilterCriteria, Pagination};
