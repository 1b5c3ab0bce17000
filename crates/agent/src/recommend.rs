//! Catalog lookups behind a chat reply.
//!
//! Candidate selection is a priority chain of [`RecommendationStrategy`]
//! values. Each strategy either declines (it does not apply to the message)
//! or yields a catalog query; the first query with a non-empty result wins.
//! [`RecommendationStrategy::TopSellers`] always applies, so the chain ends
//! in a result that is empty only when no product is in stock.

use std::sync::LazyLock;

use storefront_core::catalog::{CatalogQuery, CatalogStore, ProductFilter, SortField, SortKey, TextField};
use storefront_core::domain::product::Product;
use storefront_core::errors::ApplicationError;
use tracing::debug;

use crate::conversation::{normalize_text, Term};

/// Upper bound on products attached to a single reply.
pub const MAX_RECOMMENDATIONS: usize = 6;

/// Single-term rule used when a message names no known keyword. The first
/// rule whose trigger appears in the message decides the category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeuristicRule {
    pub triggers: &'static [&'static str],
    pub name_term: &'static str,
    pub category: &'static str,
}

pub const HEURISTIC_RULES: &[HeuristicRule] = &[
    HeuristicRule {
        triggers: &["earphone", "headphone", "earbud", "耳机"],
        name_term: "headphone",
        category: "Digital Accessories",
    },
    HeuristicRule {
        triggers: &["charge", "charger", "charging", "充电"],
        name_term: "charger",
        category: "Digital Accessories",
    },
    HeuristicRule {
        triggers: &["watch", "band", "手环"],
        name_term: "band",
        category: "Smart Wearables",
    },
    HeuristicRule {
        triggers: &["keyboard", "键盘"],
        name_term: "keyboard",
        category: "Computer Peripherals",
    },
    HeuristicRule {
        triggers: &["mouse", "鼠标"],
        name_term: "mouse",
        category: "Computer Peripherals",
    },
    HeuristicRule {
        triggers: &["speaker", "音箱"],
        name_term: "speaker",
        category: "Smart Home",
    },
];

/// Compiled triggers, index-aligned with [`HEURISTIC_RULES`].
static RULE_TRIGGERS: LazyLock<Vec<Vec<Term>>> =
    LazyLock::new(|| HEURISTIC_RULES.iter().map(|rule| Term::compile_all(rule.triggers)).collect());

pub fn matching_rule(message: &str) -> Option<&'static HeuristicRule> {
    let normalized = normalize_text(message);
    HEURISTIC_RULES.iter().zip(RULE_TRIGGERS.iter()).find_map(|(rule, triggers)| {
        triggers.iter().any(|trigger| trigger.is_mentioned_in(&normalized)).then_some(rule)
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecommendationStrategy {
    /// Any extracted keyword in name, category or description.
    KeywordMatch,
    /// No keywords, but a heuristic rule names a product type.
    HeuristicCategory,
    /// Nothing recognisable in the message; best scored products overall.
    CatalogRanked,
    /// Best sellers with stock left.
    TopSellers,
}

impl RecommendationStrategy {
    pub const CHAIN: [Self; 4] =
        [Self::KeywordMatch, Self::HeuristicCategory, Self::CatalogRanked, Self::TopSellers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordMatch => "keyword_match",
            Self::HeuristicCategory => "heuristic_category",
            Self::CatalogRanked => "catalog_ranked",
            Self::TopSellers => "top_sellers",
        }
    }

    /// The catalog query for this strategy, or `None` when it does not apply.
    pub fn query(&self, message: &str, keywords: &[String], limit: usize) -> Option<CatalogQuery> {
        match self {
            Self::KeywordMatch => {
                if keywords.is_empty() {
                    return None;
                }
                Some(ranked(CatalogQuery::new().filter(ProductFilter::TextContainsAny {
                    fields: vec![TextField::Name, TextField::Category, TextField::Description],
                    terms: keywords.to_vec(),
                }))
                .limit(limit))
            }
            Self::HeuristicCategory => {
                if !keywords.is_empty() {
                    return None;
                }
                let rule = matching_rule(message)?;
                Some(ranked(CatalogQuery::new().filter(ProductFilter::NameOrCategory {
                    name_term: rule.name_term.to_string(),
                    category: rule.category.to_string(),
                }))
                .limit(limit))
            }
            Self::CatalogRanked => {
                if !keywords.is_empty() || matching_rule(message).is_some() {
                    return None;
                }
                Some(ranked(CatalogQuery::new()).limit(limit))
            }
            Self::TopSellers => Some(top_sellers(limit)),
        }
    }
}

fn ranked(query: CatalogQuery) -> CatalogQuery {
    query
        .sort_by(SortKey::desc(SortField::PotentialScore))
        .sort_by(SortKey::desc(SortField::SalesCount))
        .sort_by(SortKey::desc(SortField::Rating))
}

pub fn top_sellers(limit: usize) -> CatalogQuery {
    CatalogQuery::new()
        .filter(ProductFilter::StockAbove(0))
        .sort_by(SortKey::desc(SortField::SalesCount))
        .sort_by(SortKey::desc(SortField::Rating))
        .limit(limit)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub strategy: RecommendationStrategy,
    pub products: Vec<Product>,
}

#[derive(Clone, Debug)]
pub struct RecommendationQueryBuilder {
    limit: usize,
}

impl Default for RecommendationQueryBuilder {
    fn default() -> Self {
        Self { limit: MAX_RECOMMENDATIONS }
    }
}

impl RecommendationQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the result size; never above [`MAX_RECOMMENDATIONS`].
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: limit.clamp(1, MAX_RECOMMENDATIONS) }
    }

    pub async fn recommend(
        &self,
        store: &dyn CatalogStore,
        message: &str,
        keywords: &[String],
    ) -> Result<Recommendation, ApplicationError> {
        for strategy in RecommendationStrategy::CHAIN {
            let Some(query) = strategy.query(message, keywords, self.limit) else {
                continue;
            };
            let products = store.query(&query).await?;
            if !products.is_empty() {
                debug!(
                    event_name = "assistant.recommendation.resolved",
                    strategy = strategy.as_str(),
                    product_count = products.len(),
                    "recommendation strategy produced candidates"
                );
                return Ok(Recommendation { strategy, products });
            }
        }

        Ok(Recommendation { strategy: RecommendationStrategy::TopSellers, products: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use storefront_core::domain::product::Product;
    use storefront_db::InMemoryProductRepository;

    use super::{
        matching_rule, RecommendationQueryBuilder, RecommendationStrategy, MAX_RECOMMENDATIONS,
    };

    fn product(id: &str, name: &str, category: &str, score: f64, sales: i64, stock: i64) -> Product {
        let mut product = Product::new(id, id.to_uppercase(), name, category, Decimal::new(9900, 2));
        product.potential_score = score;
        product.sales_count = sales;
        product.stock = stock;
        product
    }

    fn keywords(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|term| term.to_string()).collect()
    }

    #[tokio::test]
    async fn keyword_matches_are_ranked_by_score_then_sales() {
        let store = InMemoryProductRepository::with_products([
            product("p1", "Bluetooth Headphones", "Digital Accessories", 0.4, 100, 5),
            product("p2", "Sports Headphones", "Smart Wearables", 0.9, 10, 5),
            product("p3", "Mechanical Keyboard", "Computer Peripherals", 1.0, 500, 5),
        ])
        .await;

        let result = RecommendationQueryBuilder::new()
            .recommend(&store, "I want headphones", &keywords(&["headphones"]))
            .await
            .expect("recommend");

        assert_eq!(result.strategy, RecommendationStrategy::KeywordMatch);
        let ids = result.products.iter().map(|p| p.id.0.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[tokio::test]
    async fn unmatched_keywords_fall_back_to_in_stock_top_sellers() {
        let store = InMemoryProductRepository::with_products([
            product("p1", "Desk Lamp", "Daily Essentials", 0.9, 10, 5),
            product("p2", "Smart Plug", "Smart Home", 0.1, 300, 0),
            product("p3", "Monitor", "Computer Peripherals", 0.2, 200, 3),
        ])
        .await;

        let result = RecommendationQueryBuilder::new()
            .recommend(&store, "any camera?", &keywords(&["camera"]))
            .await
            .expect("recommend");

        assert_eq!(result.strategy, RecommendationStrategy::TopSellers);
        let ids = result.products.iter().map(|p| p.id.0.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["p3", "p1"]);
    }

    #[tokio::test]
    async fn heuristic_rule_matches_name_or_category() {
        let store = InMemoryProductRepository::with_products([
            product("p1", "Wireless Charger", "Digital Accessories", 0.5, 10, 5),
            product("p2", "Smart Watch", "Smart Wearables", 0.3, 10, 5),
            product("p3", "Fitness Band", "Outdoor Gear", 0.8, 10, 5),
        ])
        .await;

        let result = RecommendationQueryBuilder::new()
            .recommend(&store, "which watch should I get", &[])
            .await
            .expect("recommend");

        assert_eq!(result.strategy, RecommendationStrategy::HeuristicCategory);
        let ids = result.products.iter().map(|p| p.id.0.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["p3", "p2"]);
    }

    #[tokio::test]
    async fn unrecognised_message_ranks_the_whole_catalog_and_caps_at_six() {
        let products = (0..10)
            .map(|index| {
                product(&format!("p{index:02}"), "Gadget", "Daily Essentials", index as f64 / 10.0, 1, 1)
            })
            .collect::<Vec<_>>();
        let store = InMemoryProductRepository::with_products(products).await;

        let result = RecommendationQueryBuilder::new()
            .recommend(&store, "hello", &[])
            .await
            .expect("recommend");

        assert_eq!(result.strategy, RecommendationStrategy::CatalogRanked);
        assert_eq!(result.products.len(), MAX_RECOMMENDATIONS);
        assert_eq!(result.products[0].id.0, "p09");
    }

    #[tokio::test]
    async fn empty_catalog_yields_empty_result_without_error() {
        let store = InMemoryProductRepository::new();

        let result = RecommendationQueryBuilder::new()
            .recommend(&store, "recommend me something", &[])
            .await
            .expect("recommend");

        assert!(result.products.is_empty());
    }

    #[test]
    fn heuristic_rules_fire_in_priority_order() {
        assert_eq!(matching_rule("earphone with charging case").map(|r| r.name_term), Some("headphone"));
        assert_eq!(matching_rule("需要键盘").map(|r| r.category), Some("Computer Peripherals"));
        assert_eq!(matching_rule("Bluetooth SPEAKER").map(|r| r.category), Some("Smart Home"));
        assert!(matching_rule("hello").is_none());
    }

    #[test]
    fn heuristic_triggers_ignore_words_that_merely_contain_them() {
        assert!(matching_rule("a gift for my husband").is_none());
        assert!(matching_rule("I'll watch the game tonight").is_some());
        assert_eq!(matching_rule("two fitness bands").map(|r| r.category), Some("Smart Wearables"));
        assert!(matching_rule("what a surcharge").is_none());
    }
}
