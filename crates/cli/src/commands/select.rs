use std::fmt::Write as _;

use storefront_core::domain::product::Product;
use storefront_core::selection::{ScoringEngine, SelectionService};
use storefront_db::SqlProductRepository;

use crate::commands::{with_migrated_pool, CommandResult, EXIT_EXECUTION};

/// Runs one full ranking pass. `limit` overrides `selection.top_n`.
pub fn run(limit: Option<usize>) -> CommandResult {
    let outcome = with_migrated_pool("select", |config, pool| async move {
        let service = SelectionService::new(
            ScoringEngine::new(config.selection.market_trends()),
            config.selection.top_n,
        );
        let store = SqlProductRepository::new(pool);
        service
            .rank(&store, limit.unwrap_or(service.top_n()).max(1))
            .await
            .map_err(|error| ("selection", error.to_string(), EXIT_EXECUTION))
    });

    match outcome {
        Ok(ranked) => CommandResult::success("select", summary(&ranked)),
        Err(result) => result,
    }
}

fn summary(ranked: &[Product]) -> String {
    if ranked.is_empty() {
        return "ranking pass completed: catalog is empty".to_string();
    }
    let mut message = format!("ranking pass completed: top {} products", ranked.len());
    for (index, product) in ranked.iter().enumerate() {
        let _ = write!(
            message,
            "\n  {}. {} [{}] score {:.2}",
            index + 1,
            product.name,
            product.category,
            product.potential_score
        );
    }
    message
}
