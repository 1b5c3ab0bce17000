use storefront_core::catalog::CatalogStore;
use storefront_core::domain::product::Product;
use storefront_core::errors::ApplicationError;
use tracing::info;

use crate::compose::ResponseComposer;
use crate::conversation::{ExtractedIntent, IntentExtractor};
use crate::recommend::{RecommendationQueryBuilder, RecommendationStrategy};

/// Where a reply came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplySource {
    Local,
    Remote,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssistantReply {
    pub message: String,
    pub products: Vec<Product>,
    pub source: ReplySource,
}

/// Deterministic local pipeline: extract intent and keywords, pick
/// candidates through the strategy chain, render the canned reply.
#[derive(Clone, Debug, Default)]
pub struct ShoppingAssistant {
    extractor: IntentExtractor,
    recommender: RecommendationQueryBuilder,
    composer: ResponseComposer,
}

impl ShoppingAssistant {
    pub fn new(
        extractor: IntentExtractor,
        recommender: RecommendationQueryBuilder,
        composer: ResponseComposer,
    ) -> Self {
        Self { extractor, recommender, composer }
    }

    pub fn extractor(&self) -> &IntentExtractor {
        &self.extractor
    }

    pub async fn respond(
        &self,
        store: &dyn CatalogStore,
        message: &str,
    ) -> Result<AssistantReply, ApplicationError> {
        let ExtractedIntent { intent, keywords } = self.extractor.extract(message);
        let recommendation = self.recommender.recommend(store, message, &keywords).await?;
        let reply = self.composer.compose(intent, message, &recommendation.products);

        info!(
            event_name = "assistant.local.replied",
            intent = intent.as_str(),
            keyword_count = keywords.len(),
            strategy = strategy_label(&recommendation.strategy, recommendation.products.is_empty()),
            product_count = recommendation.products.len(),
            "local assistant reply composed"
        );

        Ok(AssistantReply {
            message: reply,
            products: recommendation.products,
            source: ReplySource::Local,
        })
    }
}

fn strategy_label(strategy: &RecommendationStrategy, empty: bool) -> &'static str {
    if empty {
        "none"
    } else {
        strategy.as_str()
    }
}
