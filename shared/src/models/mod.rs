//! Data models
//!
//! Shared between jewel-server and the clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are epoch
//! milliseconds.

pub mod category;
pub mod newsletter;
pub mod product;

// Re-exports
pub use category::*;
pub use newsletter::*;
pub use product::*;
