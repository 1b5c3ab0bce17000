use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl OrderId {
    /// Customer-facing order number, e.g. `OD00000042`.
    pub fn order_no(&self) -> String {
        format!("OD{:08}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Shipped => "SHIPPED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "SHIPPED" => Some(Self::Shipped),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Paid, shipped and completed orders count towards sales.
    pub fn counts_as_revenue(&self) -> bool {
        matches!(self, Self::Paid | Self::Shipped | Self::Completed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: String,
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An order that passed validation and pricing but is not yet persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricedOrder {
    pub customer_id: String,
    pub shipping_address: String,
    pub source: Option<String>,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub tracking_number: Option<String>,
    pub source: Option<String>,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl OrderRequest {
    /// Validates the request against the current catalog snapshot and prices
    /// every line at the product's current price.
    pub fn price(&self, products: &HashMap<ProductId, Product>) -> Result<PricedOrder, DomainError> {
        let customer_id = self.customer_id.trim();
        if customer_id.is_empty() {
            return Err(DomainError::InvalidInput("customer_id is required".to_string()));
        }
        if self.items.is_empty() {
            return Err(DomainError::InvalidInput("order has no items".to_string()));
        }

        let mut lines = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if item.quantity <= 0 {
                return Err(DomainError::InvalidInput(format!(
                    "quantity for product `{}` must be positive",
                    item.product_id
                )));
            }
            let product = products
                .get(&item.product_id)
                .ok_or_else(|| DomainError::not_found("product", item.product_id.0.clone()))?;
            if item.quantity > product.stock {
                return Err(DomainError::InsufficientStock {
                    product_id: product.id.0.clone(),
                    requested: item.quantity,
                    available: product.stock,
                });
            }
            lines.push(OrderLine {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: item.quantity,
                unit_price: product.price,
            });
        }

        let total_amount = lines.iter().map(OrderLine::line_total).sum();
        Ok(PricedOrder {
            customer_id: customer_id.to_string(),
            shipping_address: self.shipping_address.trim().to_string(),
            source: self.source.clone().filter(|source| !source.trim().is_empty()),
            lines,
            total_amount,
        })
    }
}
