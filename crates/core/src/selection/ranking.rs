use std::sync::Mutex;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::info;

use super::report::MarketTrendReport;
use super::scoring::{RandomSource, ScoringEngine, SeededRandom};
use super::DEFAULT_TOP_N;
use crate::catalog::{CatalogQuery, CatalogStore, SortField, SortKey};
use crate::domain::product::Product;
use crate::errors::ApplicationError;

/// Full-catalog recompute: every pass rescores and rewrites every product,
/// then reads back the top entries by score.
pub struct SelectionService {
    engine: ScoringEngine,
    random: Mutex<Box<dyn RandomSource>>,
    top_n: usize,
}

impl SelectionService {
    pub fn new(engine: ScoringEngine, top_n: usize) -> Self {
        Self::with_random(engine, top_n, Box::new(SeededRandom::from_entropy()))
    }

    pub fn with_random(engine: ScoringEngine, top_n: usize, random: Box<dyn RandomSource>) -> Self {
        Self { engine, random: Mutex::new(random), top_n: top_n.max(1) }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub async fn generate_recommendations(
        &self,
        store: &dyn CatalogStore,
    ) -> Result<Vec<Product>, ApplicationError> {
        self.rank(store, self.top_n).await
    }

    /// Rescores the catalog and returns at most `limit` products, best first.
    pub async fn rank(
        &self,
        store: &dyn CatalogStore,
        limit: usize,
    ) -> Result<Vec<Product>, ApplicationError> {
        let started = Instant::now();
        let products = store.query(&CatalogQuery::new()).await?;

        for product in &products {
            let scored = {
                let mut random = self.random.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                self.engine.score(&product.category, random.as_mut())
            };
            store.update_selection(&product.id, scored.score, &scored.reason).await?;
        }

        let top = store
            .query(&CatalogQuery::new().sort_by(SortKey::desc(SortField::PotentialScore)).limit(limit))
            .await?;

        info!(
            event_name = "selection.ranking.completed",
            scored_products = products.len(),
            returned_products = top.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "selection ranking pass completed"
        );

        Ok(top)
    }

    pub fn market_trend_report(&self, today: NaiveDate) -> MarketTrendReport {
        MarketTrendReport::build(self.engine.trends(), today)
    }
}

impl Default for SelectionService {
    fn default() -> Self {
        Self::new(ScoringEngine::default(), DEFAULT_TOP_N)
    }
}
