//! Sort keys and comparators for the product list

use crate::models::Product;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sortable product column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Price,
    Stock,
    #[default]
    CreatedAt,
    UpdatedAt,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Apply the direction to an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Resolved sort instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Compare two products under this spec
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ascending = match self.key {
            SortKey::Name => locale_cmp(&a.name, &b.name),
            SortKey::Price => a.price.total_cmp(&b.price),
            SortKey::Stock => a.stock.cmp(&b.stock),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        self.order.apply(ascending)
    }

    /// Stable in-place sort
    pub fn sort(&self, products: &mut [Product]) {
        products.sort_by(|a, b| self.compare(a, b));
    }
}

/// Locale-style string comparison
///
/// Case-insensitive on the first pass; strings that differ only by case put
/// the lower-case form first (`"alpha" < "Alpha"`).
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_cmp_ignores_case_first() {
        assert_eq!(locale_cmp("Alpha", "mid"), Ordering::Less);
        assert_eq!(locale_cmp("mid", "Zeta"), Ordering::Less);
        assert_eq!(locale_cmp("zeta", "Zeta"), Ordering::Less);
        assert_eq!(locale_cmp("Ring", "Ring"), Ordering::Equal);
    }

    #[test]
    fn test_sort_key_wire_names() {
        assert_eq!(
            serde_json::to_string(&SortKey::CreatedAt).unwrap(),
            "\"createdAt\""
        );
        let k: SortKey = serde_json::from_str("\"updatedAt\"").unwrap();
        assert_eq!(k, SortKey::UpdatedAt);
        let o: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(o, SortOrder::Asc);
    }

    #[test]
    fn test_default_spec_is_newest_first() {
        let spec = SortSpec::default();
        assert_eq!(spec.key, SortKey::CreatedAt);
        assert_eq!(spec.order, SortOrder::Desc);
    }
}
