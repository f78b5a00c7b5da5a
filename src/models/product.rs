use rust_decimal::Decimal;

use crate::models::Category;

/// A sellable item. Every product belongs to exactly one category; the
/// embedded reference is re-resolved against the store on every save.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Option<i64>,
    pub code: String,
    pub name: String,
    pub price: Decimal,
    pub category: Category,
    pub created_at: String,
}

impl Product {
    pub fn new(code: String, name: String, price: Decimal, category: Category) -> Self {
        Self {
            id: None,
            code,
            name,
            price,
            category,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
