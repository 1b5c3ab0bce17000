//! Trend report and analysis export records served next to the ranking.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CategoryTrend, MarketTrends};
use crate::domain::product::Product;

/// Upper bound on records in a full analysis export.
pub const MAX_EXPORT_RECORDS: usize = 50;

const REPORT_TITLE: &str = "Cross-border E-commerce Market Trend Report";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopKpi {
    pub conversion_rate: String,
    pub average_order_value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketTrendReport {
    pub title: String,
    pub date: String,
    pub growth_category: Vec<String>,
    pub top_kpi: TopKpi,
    pub trends: Vec<CategoryTrend>,
}

impl MarketTrendReport {
    pub fn build(trends: &MarketTrends, today: NaiveDate) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            date: today.format("%Y-%m-%d").to_string(),
            growth_category: ["Baby & Toys", "Electronics", "Outdoor Gear"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            top_kpi: TopKpi {
                conversion_rate: "2.5% (+0.2%)".to_string(),
                average_order_value: "¥350.00 (-¥10.50)".to_string(),
            },
            trends: trends.entries().to_vec(),
        }
    }
}

/// One product's analysis as written to the export file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductAnalysisRecord {
    pub product_id: String,
    pub product_name: String,
    pub sku: String,
    pub category: String,
    pub price: Decimal,
    pub potential_score: f64,
    pub selection_reason: String,
    pub rating: f64,
    pub sales_count: i64,
    pub stock: i64,
    pub export_time: String,
}

impl ProductAnalysisRecord {
    pub fn from_product(product: &Product, exported_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id.0.clone(),
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            category: product.category.clone(),
            price: product.price,
            potential_score: product.potential_score,
            selection_reason: product.selection_reason.clone(),
            rating: product.rating,
            sales_count: product.sales_count,
            stock: product.stock,
            export_time: exported_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionExportEntry {
    #[serde(flatten)]
    pub record: ProductAnalysisRecord,
    pub rank: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionExport {
    pub export_time: String,
    pub total_products: usize,
    pub recommended_products: Vec<SelectionExportEntry>,
    pub market_trend: MarketTrendReport,
}

impl SelectionExport {
    /// Builds the export from ranked products, keeping the first
    /// [`MAX_EXPORT_RECORDS`] entries.
    pub fn build(ranked: &[Product], market_trend: MarketTrendReport, exported_at: DateTime<Utc>) -> Self {
        let recommended_products = ranked
            .iter()
            .take(MAX_EXPORT_RECORDS)
            .enumerate()
            .map(|(index, product)| SelectionExportEntry {
                record: ProductAnalysisRecord::from_product(product, exported_at),
                rank: index + 1,
            })
            .collect::<Vec<_>>();

        Self {
            export_time: exported_at.to_rfc3339(),
            total_products: recommended_products.len(),
            recommended_products,
            market_trend,
        }
    }

    /// Attachment name, e.g. `ai_analysis_report_20260101_093000.json`.
    pub fn file_name(exported_at: DateTime<Utc>) -> String {
        format!("ai_analysis_report_{}.json", exported_at.format("%Y%m%d_%H%M%S"))
    }
}
