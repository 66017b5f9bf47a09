use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FromRow, ProductId};

/// Catalog entry shown when browsing or searching
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowseItem {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: String,
}

impl FromRow for BrowseItem {
    const ENTITY: &'static str = "browse_item";
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["id", "name", "category", "price", "description"];
}

impl BrowseItem {
    pub fn in_category(&self, category: &str) -> bool {
        self.category == category
    }
}
