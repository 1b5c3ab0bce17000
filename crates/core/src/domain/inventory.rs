//! Stock monitoring: low-stock listing, restock suggestions and manual
//! purchase orders.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// Products below this stock count are reported as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;
/// Products below this stock count receive a restock suggestion.
pub const RESTOCK_WATCH_STOCK: i64 = 20;
pub const MAX_LOW_STOCK_ITEMS: usize = 20;
pub const MAX_RESTOCK_SUGGESTIONS: usize = 10;
/// Days covered by the alert trend, today included.
pub const ALERT_TREND_DAYS: u32 = 7;

pub const MIN_RESTOCK_QUANTITY: i64 = 50;
pub const DEFAULT_PURCHASE_QUANTITY: i64 = 50;
pub const PURCHASE_ORDER_PRIORITY: u8 = 10;
pub const PURCHASE_ORDER_REASON: &str = "manual purchase order";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestockStatus {
    Pending,
    Ordered,
    Received,
}

impl RestockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ordered => "ORDERED",
            Self::Received => "RECEIVED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "ORDERED" => Some(Self::Ordered),
            "RECEIVED" => Some(Self::Received),
            _ => None,
        }
    }
}

/// 10 below 5 units, 8 below 10, 5 otherwise.
pub fn restock_priority(stock: i64) -> u8 {
    if stock < 5 {
        10
    } else if stock < 10 {
        8
    } else {
        5
    }
}

/// Thirty days of average sales, never less than [`MIN_RESTOCK_QUANTITY`].
/// `sales_count` is treated as the last thirty days of sales.
pub fn suggested_restock_quantity(sales_count: i64) -> i64 {
    sales_count.max(MIN_RESTOCK_QUANTITY)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockProduct {
    pub id: ProductId,
    pub name: String,
    pub stock: i64,
    pub category: String,
    pub sales_count: i64,
}

impl From<&Product> for LowStockProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            stock: product.stock,
            category: product.category.clone(),
            sales_count: product.sales_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockSuggestion {
    pub product_id: ProductId,
    pub product_name: String,
    pub current_stock: i64,
    pub suggested_quantity: i64,
    pub priority: u8,
    pub reason: String,
}

impl RestockSuggestion {
    pub fn for_product(product: &Product) -> Self {
        let suggested_quantity = suggested_restock_quantity(product.sales_count);
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            current_stock: product.stock,
            suggested_quantity,
            priority: restock_priority(product.stock),
            reason: format!(
                "current stock {}, restock {} units to keep sales steady",
                product.stock, suggested_quantity
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTrendPoint {
    /// `%m-%d`.
    pub date: String,
    pub alerts: i64,
    pub restocked: i64,
}

/// One point per day for the [`ALERT_TREND_DAYS`] days ending on `today`,
/// oldest first. No stock history is kept, so every day reports the current
/// alert count; `restocked` counts purchase orders raised that day.
pub fn alert_trend(
    today: NaiveDate,
    current_alerts: i64,
    restocked_on: impl Fn(NaiveDate) -> i64,
) -> Vec<AlertTrendPoint> {
    (0..ALERT_TREND_DAYS)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|day| AlertTrendPoint {
            date: day.format("%m-%d").to_string(),
            alerts: current_alerts,
            restocked: restocked_on(day),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub threshold: i64,
    pub low_stock_products: Vec<LowStockProduct>,
    pub trend_data: Vec<AlertTrendPoint>,
    pub suggestions: Vec<RestockSuggestion>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderRequest {
    pub product_id: ProductId,
    #[serde(default = "default_purchase_quantity")]
    pub quantity: i64,
}

fn default_purchase_quantity() -> i64 {
    DEFAULT_PURCHASE_QUANTITY
}

impl PurchaseOrderRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.product_id.0.trim().is_empty() {
            return Err(DomainError::InvalidInput("product_id is required".to_string()));
        }
        if self.quantity <= 0 {
            return Err(DomainError::InvalidInput("quantity must be positive".to_string()));
        }
        Ok(())
    }
}

/// A persisted restock suggestion. Manual purchase orders are stored as
/// suggestions already in [`RestockStatus::Ordered`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockRecord {
    pub id: i64,
    pub product_id: ProductId,
    pub suggested_quantity: i64,
    pub priority: u8,
    pub reason: String,
    pub status: RestockStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{
        alert_trend, restock_priority, suggested_restock_quantity, PurchaseOrderRequest,
        RestockSuggestion, ALERT_TREND_DAYS,
    };
    use crate::domain::product::{Product, ProductId};

    #[test]
    fn priority_rises_as_stock_falls() {
        assert_eq!(restock_priority(0), 10);
        assert_eq!(restock_priority(4), 10);
        assert_eq!(restock_priority(5), 8);
        assert_eq!(restock_priority(9), 8);
        assert_eq!(restock_priority(10), 5);
        assert_eq!(restock_priority(19), 5);
    }

    #[test]
    fn suggested_quantity_covers_a_month_with_a_floor() {
        assert_eq!(suggested_restock_quantity(0), 50);
        assert_eq!(suggested_restock_quantity(30), 50);
        assert_eq!(suggested_restock_quantity(900), 900);
    }

    #[test]
    fn suggestion_explains_stock_and_quantity() {
        let mut product =
            Product::new("p1", "SKU-1", "Mechanical Keyboard", "Computer Peripherals", Decimal::ONE);
        product.stock = 3;
        product.sales_count = 120;

        let suggestion = RestockSuggestion::for_product(&product);
        assert_eq!(suggestion.priority, 10);
        assert_eq!(suggestion.suggested_quantity, 120);
        assert_eq!(suggestion.reason, "current stock 3, restock 120 units to keep sales steady");
    }

    #[test]
    fn alert_trend_covers_seven_days_oldest_first() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).expect("date");
        let ordered_on = NaiveDate::from_ymd_opt(2026, 2, 28).expect("date");

        let trend = alert_trend(today, 4, |day| if day == ordered_on { 2 } else { 0 });

        assert_eq!(trend.len(), ALERT_TREND_DAYS as usize);
        assert_eq!(trend[0].date, "02-24");
        assert_eq!(trend[6].date, "03-02");
        assert!(trend.iter().all(|point| point.alerts == 4));
        assert_eq!(trend.iter().map(|point| point.restocked).sum::<i64>(), 2);
        assert_eq!(trend[4].restocked, 2);
    }

    #[test]
    fn purchase_order_requires_product_and_positive_quantity() {
        let request: PurchaseOrderRequest =
            serde_json::from_str(r#"{"product_id":"p1"}"#).expect("decode");
        assert_eq!(request.quantity, 50);
        assert!(request.validate().is_ok());

        let zero = PurchaseOrderRequest { product_id: ProductId::from("p1"), quantity: 0 };
        assert!(zero.validate().is_err());
        let blank = PurchaseOrderRequest { product_id: ProductId::from(" "), quantity: 5 };
        assert!(blank.validate().is_err());
    }
}
