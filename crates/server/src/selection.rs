//! Selection dashboard endpoints.
//!
//! - `POST /api/v1/selection/run`                 - one ranking pass, top-N plus trend report
//! - `GET  /api/v1/selection/trends`              - market-trend report
//! - `GET  /api/v1/selection/export?product_id=`  - analysis export as a JSON attachment

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::catalog::CatalogStore;
use storefront_core::domain::product::ProductId;
use storefront_core::selection::report::MAX_EXPORT_RECORDS;
use storefront_core::selection::{MarketTrendReport, ProductAnalysisRecord, SelectionExport};
use tracing::info;

use crate::bootstrap::AppState;
use crate::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/selection/run", post(run_selection))
        .route("/api/v1/selection/trends", get(market_trends))
        .route("/api/v1/selection/export", get(export_analysis))
}

#[derive(Debug, Serialize)]
pub struct SelectionRunView {
    pub ranked_at: String,
    pub recommended_products: Vec<ProductAnalysisRecord>,
    pub market_trend: MarketTrendReport,
}

async fn run_selection(State(state): State<AppState>) -> Result<Json<SelectionRunView>, ApiError> {
    let ranked = state.selection.generate_recommendations(state.catalog.as_ref()).await?;
    let now = Utc::now();

    Ok(Json(SelectionRunView {
        ranked_at: now.to_rfc3339(),
        recommended_products: ranked
            .iter()
            .map(|product| ProductAnalysisRecord::from_product(product, now))
            .collect(),
        market_trend: state.selection.market_trend_report(now.date_naive()),
    }))
}

async fn market_trends(State(state): State<AppState>) -> Json<MarketTrendReport> {
    Json(state.selection.market_trend_report(Utc::now().date_naive()))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub product_id: Option<String>,
}

async fn export_analysis(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let now = Utc::now();

    if let Some(product_id) = params.product_id.filter(|id| !id.trim().is_empty()) {
        let product = state
            .catalog
            .find(&ProductId(product_id.clone()))
            .await?
            .ok_or_else(|| ApiError::not_found("product", product_id))?;
        return Ok(attachment(now, ProductAnalysisRecord::from_product(&product, now)));
    }

    let ranked = state.selection.rank(state.catalog.as_ref(), MAX_EXPORT_RECORDS).await?;
    let export = SelectionExport::build(&ranked, state.selection.market_trend_report(now.date_naive()), now);
    info!(
        event_name = "selection.export.generated",
        total_products = export.total_products,
        "selection analysis export generated"
    );
    Ok(attachment(now, export))
}

fn attachment<T: Serialize>(exported_at: DateTime<Utc>, body: T) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", SelectionExport::file_name(exported_at));
    ([(header::CONTENT_DISPOSITION, disposition)], Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::extract::Query;
    use axum::http::{header, StatusCode};
    use axum::response::Response;
    use serde_json::Value;

    use super::{export_analysis, market_trends, run_selection, ExportParams};
    use crate::test_support::{seeded_state, state};

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn run_scores_every_product_and_attaches_trend_report() {
        let app = seeded_state().await;

        let view = run_selection(state(&app)).await.expect("run").0;

        assert_eq!(view.recommended_products.len(), 4);
        // unknown categories use the fallback trend: 0.05 * 0.6 + 0.3 * 0.4 + 0.05
        assert!(view
            .recommended_products
            .iter()
            .all(|record| (record.potential_score - 0.2).abs() < 1e-9));
        assert!(view.recommended_products.iter().all(|record| !record.selection_reason.is_empty()));
        assert_eq!(view.market_trend.trends.len(), 3);
    }

    #[tokio::test]
    async fn trend_report_uses_todays_date() {
        let app = seeded_state().await;

        let report = market_trends(state(&app)).await.0;

        assert_eq!(report.date, chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string());
        assert_eq!(report.growth_category.len(), 3);
    }

    #[tokio::test]
    async fn full_export_is_served_as_named_attachment() {
        let app = seeded_state().await;

        let response =
            export_analysis(state(&app), Query(ExportParams::default())).await.expect("export");
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .expect("content disposition")
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"ai_analysis_report_"));
        assert!(disposition.ends_with(".json\""));

        let body = json_body(response).await;
        assert_eq!(body["total_products"], 4);
        assert_eq!(body["recommended_products"][0]["rank"], 1);
        assert!(body["market_trend"]["title"].is_string());
    }

    #[tokio::test]
    async fn single_product_export_returns_one_record_or_not_found() {
        let app = seeded_state().await;

        let response = export_analysis(
            state(&app),
            Query(ExportParams { product_id: Some("prod-2".to_string()) }),
        )
        .await
        .expect("export");
        let body = json_body(response).await;
        assert_eq!(body["product_id"], "prod-2");
        assert_eq!(body["sku"], "PROD-2");

        let missing = export_analysis(
            state(&app),
            Query(ExportParams { product_id: Some("prod-404".to_string()) }),
        )
        .await;
        assert_eq!(missing.err().map(|error| error.status()), Some(StatusCode::NOT_FOUND));
    }
}
