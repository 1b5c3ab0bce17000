//! Operator endpoints over the shared product and order store.
//!
//! - `GET  /api/v1/inventory/monitor?threshold=` - low stock, alert trend, restock suggestions
//! - `POST /api/v1/inventory/monitor`            - raise a purchase order
//! - `GET  /api/v1/analytics`                    - sales and catalog dashboard

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use storefront_core::analytics::AnalyticsDashboard;
use storefront_core::domain::inventory::{
    InventoryReport, PurchaseOrderRequest, RestockRecord, DEFAULT_LOW_STOCK_THRESHOLD,
};
use storefront_db::{AnalyticsRepository, InventoryRepository};

use crate::bootstrap::AppState;
use crate::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/inventory/monitor", get(inventory_monitor).post(purchase_order))
        .route("/api/v1/analytics", get(analytics_dashboard))
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryParams {
    pub threshold: Option<String>,
}

impl InventoryParams {
    fn threshold(&self) -> Result<i64, ApiError> {
        match self.threshold.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            None => Ok(DEFAULT_LOW_STOCK_THRESHOLD),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|threshold| *threshold > 0)
                .ok_or_else(|| ApiError::bad_request("threshold must be a positive integer")),
        }
    }
}

async fn inventory_monitor(
    State(state): State<AppState>,
    Query(params): Query<InventoryParams>,
) -> Result<Json<InventoryReport>, ApiError> {
    let threshold = params.threshold()?;
    Ok(Json(state.inventory.report(threshold, Utc::now().date_naive()).await?))
}

#[derive(Debug, Serialize)]
pub struct PurchaseOrderView {
    pub message: &'static str,
    pub suggestion_id: i64,
    pub suggestion: RestockRecord,
}

async fn purchase_order(
    State(state): State<AppState>,
    Json(body): Json<PurchaseOrderRequest>,
) -> Result<(StatusCode, Json<PurchaseOrderView>), ApiError> {
    let record = state.inventory.place_purchase_order(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(PurchaseOrderView {
            message: "purchase order created",
            suggestion_id: record.id,
            suggestion: record,
        }),
    ))
}

async fn analytics_dashboard(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsDashboard>, ApiError> {
    Ok(Json(state.analytics.dashboard(Utc::now().date_naive()).await?))
}
