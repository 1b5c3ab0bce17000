use std::sync::Arc;

use storefront_agent::{AdvisoryGateway, LlmError, ShoppingAssistant};
use storefront_core::config::AppConfig;
use storefront_core::selection::{ScoringEngine, SelectionService};
use storefront_db::{
    connect_with_config, migrations, DbPool, SqlAnalyticsRepository, SqlCartRepository,
    SqlInventoryRepository, SqlOrderRepository, SqlProductRepository, SqlReviewRepository,
};
use thiserror::Error;
use tracing::info;

/// Shared handler state. Repositories are cheap pool handles; the selection
/// service owns the scoring random source.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub catalog: Arc<SqlProductRepository>,
    pub carts: Arc<SqlCartRepository>,
    pub orders: Arc<SqlOrderRepository>,
    pub reviews: Arc<SqlReviewRepository>,
    pub inventory: Arc<SqlInventoryRepository>,
    pub analytics: Arc<SqlAnalyticsRepository>,
    pub selection: Arc<SelectionService>,
    pub gateway: Arc<AdvisoryGateway>,
}

impl AppState {
    pub fn new(db_pool: DbPool, selection: SelectionService, gateway: AdvisoryGateway) -> Self {
        Self {
            catalog: Arc::new(SqlProductRepository::new(db_pool.clone())),
            carts: Arc::new(SqlCartRepository::new(db_pool.clone())),
            orders: Arc::new(SqlOrderRepository::new(db_pool.clone())),
            reviews: Arc::new(SqlReviewRepository::new(db_pool.clone())),
            inventory: Arc::new(SqlInventoryRepository::new(db_pool.clone())),
            analytics: Arc::new(SqlAnalyticsRepository::new(db_pool.clone())),
            selection: Arc::new(selection),
            gateway: Arc::new(gateway),
            db_pool,
        }
    }
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client setup failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let selection = SelectionService::new(
        ScoringEngine::new(config.selection.market_trends()),
        config.selection.top_n,
    );
    let gateway = AdvisoryGateway::from_config(ShoppingAssistant::default(), &config.llm)
        .map_err(BootstrapError::Llm)?;
    info!(
        event_name = "system.bootstrap.assistant_ready",
        correlation_id = "bootstrap",
        remote_enabled = gateway.is_remote_enabled(),
        model = %config.llm.model,
        "shopping assistant initialized"
    );

    let state = AppState::new(db_pool, selection, gateway);
    Ok(Application { config, state })
}

#[cfg(test)]
mod tests {
    use storefront_core::config::AppConfig;

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    fn config_with_database(url: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = url.to_string();
        config
    }

    #[tokio::test]
    async fn bootstrap_reports_unreachable_database() {
        let result =
            bootstrap_with_config(config_with_database("sqlite:///missing-storefront-dir/shop.db")).await;

        assert!(matches!(result, Err(BootstrapError::DatabaseConnect(_))));
    }

    #[tokio::test]
    async fn bootstrap_applies_schema_to_in_memory_database() {
        let app = bootstrap_with_config(config_with_database("sqlite::memory:"))
            .await
            .expect("bootstrap should succeed with an in-memory database");
        assert!(!app.state.gateway.is_remote_enabled());

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('product', 'orders', 'order_item', 'cart_item',
                                                'product_review', 'restock_suggestion')",
        )
        .fetch_one(&app.state.db_pool)
        .await
        .expect("schema query");
        assert_eq!(table_count, 6);

        app.state.db_pool.close().await;
    }
}
