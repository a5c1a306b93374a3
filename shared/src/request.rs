//! Request types shared between jewel-server and jewel-client

use crate::models::ProductStatus;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Query parameters of `GET /api/products/admin/all`
///
/// These are the *server-side* filters: changing any of them requires a new
/// fetch. Everything else in [`crate::filter::FilterCriteria`] is applied to
/// the fetched page locally.
///
/// Blank values (`?category=&status=`) decode as absent, the way the admin UI
/// sends untouched filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminProductQuery {
    /// Free-text search over name, code and description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Category id
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<i64>,
    /// Product status
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<ProductStatus>,
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page", deserialize_with = "page_or_default")]
    pub page: u32,
    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_limit", deserialize_with = "limit_or_default")]
    pub limit: u32,
}

/// Parse a query value with `FromStr`, treating a blank value as absent
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(D::Error::custom),
    }
}

fn page_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(blank_as_none(deserializer)?.unwrap_or_else(default_page))
}

fn limit_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(blank_as_none(deserializer)?.unwrap_or_else(default_limit))
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// Upper bound for `limit`
pub const MAX_PAGE_SIZE: u32 = 100;

impl AdminProductQuery {
    pub fn new() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            ..Default::default()
        }
    }

    /// Page number clamped to at least 1
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Limit clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for database queries
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Trimmed search text, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_query() {
        let q: AdminProductQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 20);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_blank_query_values_are_absent() {
        // Query strings reach the deserializer as strings
        let q: AdminProductQuery = serde_json::from_str(
            r#"{"search":"","category":"","status":"","page":"","limit":""}"#,
        )
        .unwrap();
        assert_eq!(q.search_term(), None);
        assert_eq!(q.category, None);
        assert_eq!(q.status, None);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 20);
    }

    #[test]
    fn test_query_values_parsed() {
        let q: AdminProductQuery = serde_json::from_str(
            r#"{"search":"ring","category":"4","status":"draft","page":"2","limit":"50"}"#,
        )
        .unwrap();
        assert_eq!(q.search_term(), Some("ring"));
        assert_eq!(q.category, Some(4));
        assert_eq!(q.status, Some(ProductStatus::Draft));
        assert_eq!(q.page, 2);
        assert_eq!(q.limit, 50);
        assert_eq!(q.offset(), 50);
    }

    #[test]
    fn test_malformed_query_value_rejected() {
        let err = serde_json::from_str::<AdminProductQuery>(r#"{"category":"rings"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid digit"), "{err}");
        assert!(serde_json::from_str::<AdminProductQuery>(r#"{"status":"sold"}"#).is_err());
    }

    #[test]
    fn test_clamping() {
        let q = AdminProductQuery {
            page: 0,
            limit: 1000,
            ..AdminProductQuery::new()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);

        let q = AdminProductQuery {
            page: 3,
            limit: 10,
            ..AdminProductQuery::new()
        };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_blank_search_is_absent() {
        let q = AdminProductQuery {
            search: Some("   ".into()),
            ..AdminProductQuery::new()
        };
        assert_eq!(q.search_term(), None);

        let q = AdminProductQuery {
            search: Some(" ring ".into()),
            ..AdminProductQuery::new()
        };
        assert_eq!(q.search_term(), Some("ring"));
    }
}
