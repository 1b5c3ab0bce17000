use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub customer_id: String,
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub stock: i64,
    pub quantity: i64,
    pub line_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartSummary {
    pub customer_id: String,
    pub items: Vec<CartLine>,
    pub total_quantity: i64,
    pub total_amount: Decimal,
}

impl CartSummary {
    /// Joins stored cart rows with their product snapshots. Rows whose product
    /// is gone from the catalog are skipped.
    pub fn build(customer_id: &str, rows: Vec<(CartItem, Option<Product>)>) -> Self {
        let items = rows
            .into_iter()
            .filter_map(|(item, product)| {
                let product = product?;
                Some(CartLine {
                    line_total: product.price * Decimal::from(item.quantity),
                    image: product.image_or_default().to_string(),
                    product_id: product.id,
                    name: product.name,
                    price: product.price,
                    stock: product.stock,
                    quantity: item.quantity,
                })
            })
            .collect::<Vec<_>>();

        Self {
            customer_id: customer_id.to_string(),
            total_quantity: items.iter().map(|line| line.quantity).sum(),
            total_amount: items.iter().map(|line| line.line_total).sum(),
            items,
        }
    }
}
