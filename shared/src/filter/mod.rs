//! Product list filter/sort pipeline
//!
//! [`derive`] turns a fetched page of products plus a [`FilterCriteria`]
//! into the visible rows. It is a pure function: the same input always
//! yields the same output, and applying its result to the same criteria
//! again changes nothing.
//!
//! Passes run in a fixed order and each one is a no-op when its criterion is
//! absent:
//!
//! 1. text search (name, code, description; case-insensitive)
//! 2. category
//! 3. active state
//! 4. price and stock ranges (inclusive)
//! 5. featured / digital flags
//! 6. creation date range (inclusive, see [`date`])
//! 7. stable sort
//!
//! When neither `sort_by` nor `sort_order` is set the sort pass is skipped
//! and input order is kept. Setting only one of them fills the other from
//! [`SortSpec::default`] (`createdAt`, `desc`).

pub mod date;
pub mod sort;

pub use sort::{SortKey, SortOrder, SortSpec, locale_cmp};

use crate::models::Product;
use crate::request::AdminProductQuery;
use serde::{Deserialize, Serialize};

/// User-supplied filter configuration; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub search: Option<String>,
    pub category: Option<i64>,
    /// `Some(true)` keeps active products, `Some(false)` keeps the rest
    pub is_active: Option<bool>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub stock_min: Option<i64>,
    pub stock_max: Option<i64>,
    pub featured: Option<bool>,
    pub digital: Option<bool>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed search text, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The sort to apply, or `None` to keep input order
    pub fn sort_spec(&self) -> Option<SortSpec> {
        if self.sort_by.is_none() && self.sort_order.is_none() {
            return None;
        }
        let default = SortSpec::default();
        Some(SortSpec::new(
            self.sort_by.unwrap_or(default.key),
            self.sort_order.unwrap_or(default.order),
        ))
    }

    /// Whether the server-side part of two criteria sets differs
    ///
    /// Search text, category and active state are pushed to
    /// `GET /api/products/admin/all`; a change in any of them needs a
    /// re-fetch. Everything else is recomputed locally.
    pub fn server_filters_differ(&self, other: &FilterCriteria) -> bool {
        self.search_term() != other.search_term()
            || self.category != other.category
            || self.is_active != other.is_active
    }

    /// Server query for the given page
    ///
    /// `is_active == Some(false)` cannot be expressed as a single status, so
    /// it is left to the local pass.
    pub fn to_admin_query(&self, page: u32, limit: u32) -> AdminProductQuery {
        AdminProductQuery {
            search: self.search_term().map(str::to_string),
            category: self.category,
            status: match self.is_active {
                Some(true) => Some(crate::models::ProductStatus::Active),
                _ => None,
            },
            page,
            limit,
        }
    }

    // ========== Builder helpers ==========

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category: i64) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn with_stock_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.stock_min = min;
        self.stock_max = max;
        self
    }

    pub fn with_date_range(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.date_from = from.map(str::to_string);
        self.date_to = to.map(str::to_string);
        self
    }

    pub fn with_sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = Some(key);
        self.sort_order = Some(order);
        self
    }
}

/// Criteria with bounds parsed and search text lower-cased once
struct Compiled<'a> {
    criteria: &'a FilterCriteria,
    needle: Option<String>,
    created_from: Option<i64>,
    created_to: Option<i64>,
}

impl<'a> Compiled<'a> {
    fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            needle: criteria.search_term().map(str::to_lowercase),
            created_from: criteria
                .date_from
                .as_deref()
                .and_then(date::parse_lower_bound),
            created_to: criteria
                .date_to
                .as_deref()
                .and_then(date::parse_upper_bound),
        }
    }

    fn matches(&self, p: &Product) -> bool {
        let c = self.criteria;
        self.matches_search(p)
            && c.category.is_none_or(|id| p.category_id == Some(id))
            && c.is_active.is_none_or(|want| p.status.is_active() == want)
            && c.price_min.is_none_or(|min| p.price >= min)
            && c.price_max.is_none_or(|max| p.price <= max)
            && c.stock_min.is_none_or(|min| p.stock >= min)
            && c.stock_max.is_none_or(|max| p.stock <= max)
            && c.featured.is_none_or(|want| p.is_featured == want)
            && c.digital.is_none_or(|want| p.is_digital == want)
            && self.created_from.is_none_or(|from| p.created_at >= from)
            && self.created_to.is_none_or(|to| p.created_at <= to)
    }

    fn matches_search(&self, p: &Product) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };
        p.name.to_lowercase().contains(needle)
            || p.code.to_lowercase().contains(needle)
            || p
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Lower-cased text the search pass looks in
///
/// The server stores this per product so its `LIKE` search folds case the
/// same way as the local pass (Unicode, not just ASCII). Fields are joined
/// by a unit separator so a term never matches across two of them.
pub fn search_text(name: &str, code: &str, description: Option<&str>) -> String {
    let mut text = format!("{name}\u{1f}{code}");
    if let Some(description) = description {
        text.push('\u{1f}');
        text.push_str(description);
    }
    text.to_lowercase()
}

/// Derive the visible product rows
pub fn derive(records: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    let compiled = Compiled::new(criteria);
    let mut rows: Vec<Product> = records
        .iter()
        .filter(|p| compiled.matches(p))
        .cloned()
        .collect();

    if let Some(spec) = criteria.sort_spec() {
        spec.sort(&mut rows);
    }
    rows
}
