//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use clove_core::{CategoryId, ProductId, ProductImageId, SupplierId};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub product_id: ProductId,
    pub product_name: String,
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    /// Whether the product is shown in the catalog.
    pub is_visible: bool,
    /// Units sold to date; drives the top-selling ranking.
    pub quantity_sold: i32,
    /// Popularity metric; drives the popular ranking.
    pub popularity_score: i32,
    /// Current promotion in percent; drives the promotions ranking.
    pub promotion_percentage: i32,
    pub creation_date: DateTime<Utc>,
}

/// An image attached to a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub image_id: ProductImageId,
    pub product_id: ProductId,
    /// Stored file name under the public image directory.
    pub image_url: String,
}

/// A product together with its images.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

/// Full product detail: product, images, and resolved reference names.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
    pub images: Vec<ProductImage>,
}
