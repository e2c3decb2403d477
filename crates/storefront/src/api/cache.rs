//! Cache types for catalog reads.

use marigold_core::{CategoryId, ProductId};

use super::types::{Category, Product};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Category(CategoryId),
    Products,
    Product(ProductId),
    ProductsByCategory(CategoryId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Category(Category),
    Products(Vec<Product>),
    Product(Box<Product>),
}
