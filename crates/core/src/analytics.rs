//! Operations dashboard: sales totals, a daily sales trend, best sellers and
//! per-category stats.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderStatus;
use crate::domain::product::{Product, ProductId};

pub const SALES_TREND_DAYS: u32 = 7;
pub const MAX_TOP_PRODUCTS: usize = 10;
pub const MAX_CATEGORY_STATS: usize = 10;

/// The order fields the dashboard aggregates over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderFact {
    pub customer_id: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub today_sales: Decimal,
    pub total_orders: usize,
    pub today_orders: usize,
    /// Distinct customers with at least one order.
    pub active_users: usize,
    pub total_products: i64,
    pub low_stock_products: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesTrendPoint {
    /// `%Y-%m-%d`.
    pub date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sales: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub id: ProductId,
    pub name: String,
    pub sales_count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub rating: f64,
}

impl From<&Product> for TopProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            sales_count: product.sales_count,
            price: product.price,
            rating: product.rating,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
    pub total_sales: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsDashboard {
    pub stats: DashboardStats,
    pub sales_trend: Vec<SalesTrendPoint>,
    pub top_products: Vec<TopProduct>,
    pub category_stats: Vec<CategoryStat>,
}

/// Order-derived figures. Days are UTC calendar days.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub today_sales: Decimal,
    pub total_orders: usize,
    pub today_orders: usize,
    pub active_users: usize,
    pub trend: Vec<SalesTrendPoint>,
}

impl SalesSummary {
    pub fn from_orders(orders: &[OrderFact], today: NaiveDate) -> Self {
        let mut daily_sales = BTreeMap::<NaiveDate, Decimal>::new();
        let mut total_sales = Decimal::ZERO;
        let mut today_orders = 0;
        let mut customers = HashSet::new();

        for order in orders {
            let day = order.created_at.date_naive();
            customers.insert(order.customer_id.as_str());
            if day == today {
                today_orders += 1;
            }
            if order.status.counts_as_revenue() {
                total_sales += order.total_amount;
                *daily_sales.entry(day).or_default() += order.total_amount;
            }
        }

        let trend = (0..SALES_TREND_DAYS)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
            .map(|day| SalesTrendPoint {
                date: day.format("%Y-%m-%d").to_string(),
                sales: daily_sales.get(&day).copied().unwrap_or_default(),
            })
            .collect();

        Self {
            total_sales,
            today_sales: daily_sales.get(&today).copied().unwrap_or_default(),
            total_orders: orders.len(),
            today_orders,
            active_users: customers.len(),
            trend,
        }
    }
}
