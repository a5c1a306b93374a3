//! Product Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Publication status of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Draft => "draft",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "draft" => Ok(Self::Draft),
            other => Err(format!("unknown product status `{other}`")),
        }
    }
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Unique product code (SKU)
    pub code: String,
    pub description: Option<String>,
    /// Category reference
    pub category_id: Option<i64>,
    pub price: f64,
    pub stock: i64,
    pub status: ProductStatus,
    pub is_featured: bool,
    pub is_digital: bool,
    /// Listed in the online storefront
    pub show_in_store: bool,
    /// Listed in the printed/PDF catalog
    pub show_in_catalog: bool,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "Code must be 1-64 characters"))]
    pub code: String,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
    pub category_id: Option<i64>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    #[serde(default)]
    pub stock: i64,
    pub status: Option<ProductStatus>,
    pub is_featured: Option<bool>,
    pub is_digital: Option<bool>,
    pub show_in_store: Option<bool>,
    pub show_in_catalog: Option<bool>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Code must be 1-64 characters"))]
    pub code: Option<String>,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
    pub category_id: Option<i64>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i64>,
    pub status: Option<ProductStatus>,
    pub is_featured: Option<bool>,
    pub is_digital: Option<bool>,
    pub show_in_store: Option<bool>,
    pub show_in_catalog: Option<bool>,
}
