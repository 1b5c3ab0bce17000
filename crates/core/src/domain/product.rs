use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder shown for products without an image reference.
pub const DEFAULT_PRODUCT_IMAGE: &str =
    "https://images.unsplash.com/photo-1603789955942-64ca8f2d7c54?w=800&h=800&fit=crop";

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Catalog record. `potential_score` and `selection_reason` are rewritten by
/// every selection ranking pass and have no meaning beyond the latest pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock: i64,
    pub image_url: Option<String>,
    pub description: String,
    pub rating: f64,
    pub sales_count: i64,
    pub potential_score: f64,
    pub selection_reason: String,
}

impl Product {
    /// Minimal record with the defaults new catalog rows start with.
    pub fn new(
        id: impl Into<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: ProductId(id.into()),
            sku: sku.into(),
            name: name.into(),
            category: category.into(),
            price,
            original_price: None,
            stock: 0,
            image_url: None,
            description: String::new(),
            rating: 4.5,
            sales_count: 0,
            potential_score: 0.0,
            selection_reason: String::new(),
        }
    }

    pub fn image_or_default(&self) -> &str {
        self.image_url.as_deref().filter(|url| !url.trim().is_empty()).unwrap_or(DEFAULT_PRODUCT_IMAGE)
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Product, DEFAULT_PRODUCT_IMAGE};

    #[test]
    fn blank_image_falls_back_to_placeholder() {
        let mut product =
            Product::new("prod-1", "SKU-1", "Desk Lamp", "Daily Essentials", Decimal::new(8000, 2));
        assert_eq!(product.image_or_default(), DEFAULT_PRODUCT_IMAGE);

        product.image_url = Some("  ".to_string());
        assert_eq!(product.image_or_default(), DEFAULT_PRODUCT_IMAGE);

        product.image_url = Some("https://cdn.example.com/lamp.png".to_string());
        assert_eq!(product.image_or_default(), "https://cdn.example.com/lamp.png");
    }
}
