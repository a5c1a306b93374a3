//! Unified error system for the Jewel back-office
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors (session cookie, CSRF)
//! - 2xxx: Permission errors
//! - 6xxx: Catalog errors
//! - 7xxx: Newsletter errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//! use shared::response::ApiResponse;
//!
//! let err = AppError::with_message(ErrorCode::ProductCodeExists, "Code RING-001 already exists")
//!     .with_detail("code", "RING-001");
//!
//! let body = ApiResponse::<()>::failure(&err);
//! assert!(!body.success);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
