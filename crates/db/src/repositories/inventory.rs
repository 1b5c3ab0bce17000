use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sqlx::Row;
use tracing::info;

use storefront_core::domain::inventory::{
    alert_trend, InventoryReport, LowStockProduct, PurchaseOrderRequest, RestockRecord,
    RestockStatus, RestockSuggestion, MAX_LOW_STOCK_ITEMS, MAX_RESTOCK_SUGGESTIONS,
    PURCHASE_ORDER_PRIORITY, PURCHASE_ORDER_REASON, RESTOCK_WATCH_STOCK,
};
use storefront_core::domain::product::Product;

use super::product::{product_from_row, PRODUCT_COLUMNS};
use super::{parse_timestamp, InventoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlInventoryRepository {
    pool: DbPool,
}

impl SqlInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Lowest stock first, ties by id.
    async fn below_stock(&self, stock: i64, limit: usize) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE stock < ? ORDER BY stock ASC, id ASC LIMIT ?"
        ))
        .bind(stock)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn count_below(&self, stock: i64) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE stock < ?")
            .bind(stock)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn ordered_per_day(&self) -> Result<HashMap<NaiveDate, i64>, RepositoryError> {
        let rows = sqlx::query("SELECT created_at FROM restock_suggestion WHERE status = ?")
            .bind(RestockStatus::Ordered.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut per_day = HashMap::new();
        for row in &rows {
            let created_at = parse_timestamp("created_at", row.try_get("created_at")?)?;
            *per_day.entry(created_at.date_naive()).or_insert(0) += 1;
        }
        Ok(per_day)
    }
}

#[async_trait::async_trait]
impl InventoryRepository for SqlInventoryRepository {
    async fn report(
        &self,
        threshold: i64,
        today: NaiveDate,
    ) -> Result<InventoryReport, RepositoryError> {
        let low_stock = self.below_stock(threshold, MAX_LOW_STOCK_ITEMS).await?;
        let alerts = self.count_below(threshold).await?;
        let ordered = self.ordered_per_day().await?;
        let watch = self.below_stock(RESTOCK_WATCH_STOCK, MAX_RESTOCK_SUGGESTIONS).await?;

        Ok(InventoryReport {
            threshold,
            low_stock_products: low_stock.iter().map(LowStockProduct::from).collect(),
            trend_data: alert_trend(today, alerts, |day| ordered.get(&day).copied().unwrap_or(0)),
            suggestions: watch.iter().map(RestockSuggestion::for_product).collect(),
        })
    }

    async fn place_purchase_order(
        &self,
        request: &PurchaseOrderRequest,
    ) -> Result<RestockRecord, RepositoryError> {
        request.validate()?;
        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM product WHERE id = ?")
            .bind(&request.product_id.0)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound {
                entity: "product",
                id: request.product_id.0.clone(),
            });
        }

        let created_at = Utc::now();
        let id = sqlx::query(
            "INSERT INTO restock_suggestion
                 (product_id, suggested_quantity, priority, reason, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.product_id.0)
        .bind(request.quantity)
        .bind(i64::from(PURCHASE_ORDER_PRIORITY))
        .bind(PURCHASE_ORDER_REASON)
        .bind(RestockStatus::Ordered.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(
            event_name = "inventory.purchase_order.created",
            suggestion_id = id,
            product_id = %request.product_id,
            quantity = request.quantity,
            "purchase order recorded"
        );

        Ok(RestockRecord {
            id,
            product_id: request.product_id.clone(),
            suggested_quantity: request.quantity,
            priority: PURCHASE_ORDER_PRIORITY,
            reason: PURCHASE_ORDER_REASON.to_string(),
            status: RestockStatus::Ordered,
            created_at,
        })
    }
}
