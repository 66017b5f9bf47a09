use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{FromRow, Product, ProductId, Row, ServiceError, ServiceResult};

/// One stored cart row; `contents` holds a JSON-encoded list of cart entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartRow {
    pub id: i64,
    pub username: String,
    pub contents: String,
    pub cost: Decimal,
}

impl FromRow for CartRow {
    const ENTITY: &'static str = "cart";
    const REQUIRED_FIELDS: &'static [&'static str] = &["id", "username", "contents", "cost"];
}

/// A single element of a cart's `contents`: a product id to look up, or a
/// full product record stored inline
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CartEntry {
    Id(ProductId),
    Record(Row),
}

impl CartEntry {
    /// Resolve to a product. Ids are looked up in `products`, records are
    /// mapped strictly with [`Product::from_row`].
    pub fn resolve(self, products: &HashMap<ProductId, Product>) -> ServiceResult<Option<Product>> {
        match self {
            CartEntry::Id(id) => Ok(products.get(&id).cloned()),
            CartEntry::Record(row) => Product::from_row(row)
                .map(Some)
                .map_err(ServiceError::malformed_row),
        }
    }
}

impl CartRow {
    /// Decode the entries of this row, in stored order
    pub fn entries(&self) -> ServiceResult<Vec<CartEntry>> {
        serde_json::from_str(&self.contents)
            .map_err(|e| ServiceError::malformed_cart_contents(self.id, e))
    }

    /// Ids of the entries stored by reference, in stored order
    pub fn product_ids(&self) -> ServiceResult<Vec<ProductId>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter_map(|entry| match entry {
                CartEntry::Id(id) => Some(id),
                CartEntry::Record(_) => None,
            })
            .collect())
    }
}

/// A user's cart assembled from one stored row and its resolved products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub username: String,
    pub contents: Vec<Product>,
    pub cost: Decimal,
}

impl Cart {
    /// Build a cart from a stored row.
    ///
    /// Id entries are looked up in `products`; ids with no entry are skipped.
    /// Inline records are built directly. `cost` is taken from the row as stored.
    pub fn load(row: CartRow, products: &HashMap<ProductId, Product>) -> ServiceResult<Self> {
        let mut contents = Vec::new();
        for entry in row.entries()? {
            if let Some(product) = entry.resolve(products)? {
                contents.push(product);
            }
        }

        Ok(Self {
            id: row.id,
            username: row.username,
            contents,
            cost: row.cost,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.contents.len()
    }
}
