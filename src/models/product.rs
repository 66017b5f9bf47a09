use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FromRow;

/// Product identifier as stored in cart contents and catalog rows
pub type ProductId = i64;

/// Product record resolved through the product repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl FromRow for Product {
    const ENTITY: &'static str = "product";
    const REQUIRED_FIELDS: &'static [&'static str] = &["id", "name", "price"];
    const OPTIONAL_FIELDS: &'static [&'static str] = &["description", "category"];
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: None,
            category: None,
        }
    }
}
