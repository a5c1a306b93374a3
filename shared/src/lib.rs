//! Shared types for the Jewel back-office
//!
//! Common types used by jewel-server and jewel-client: domain models,
//! error codes, response envelopes, and the product list filter pipeline.

pub mod client;
pub mod error;
pub mod filter;
pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use filter::{FilterCriteria, SortKey, SortOrder, SortSpec};
pub use response::{ApiResponse, CsrfTokenData, Pagination};
pub use serde::{Deserialize, Serialize};
