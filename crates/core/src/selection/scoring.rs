//! Potential scoring for a single product.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::MarketTrends;

/// Weight of the category growth rate in the score.
const GROWTH_WEIGHT: f64 = 0.6;
/// Weight of the inverted competition level in the score.
const OPENNESS_WEIGHT: f64 = 0.4;
/// Upper bound of the random jitter added to every score.
const JITTER_SPAN: f64 = 0.1;
/// Scores below this get the cautionary justification.
pub const CAUTION_THRESHOLD: f64 = 0.3;

/// Source of uniform values in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Always returns the same value, clamped into `[0, 1)`.
#[derive(Clone, Copy, Debug)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionScore {
    pub score: f64,
    pub reason: String,
}

impl SelectionScore {
    pub fn is_cautionary(&self) -> bool {
        self.score < CAUTION_THRESHOLD
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScoringEngine {
    trends: MarketTrends,
}

impl ScoringEngine {
    pub fn new(trends: MarketTrends) -> Self {
        Self { trends }
    }

    pub fn trends(&self) -> &MarketTrends {
        &self.trends
    }

    /// `growth * 0.6 + (1 - competition) * 0.4 + U(0, 0.1)`, rounded to two
    /// decimals. With trend values in `[0, 1]` the result lies in `[0, 1.1]`.
    pub fn score(&self, category: &str, random: &mut dyn RandomSource) -> SelectionScore {
        let trend = self.trends.lookup(category);
        let jitter = random.next_unit() * JITTER_SPAN;
        let raw = trend.growth * GROWTH_WEIGHT + (1.0 - trend.competition) * OPENNESS_WEIGHT + jitter;
        let score = round_to_cents(raw);

        let reason = if score < CAUTION_THRESHOLD {
            format!(
                "[{category}] is fiercely competitive; growth exists but margins are squeezed. Proceed with caution."
            )
        } else {
            format!(
                "Market analysis: the [{category}] category is growing at {:.1}% with relatively low competition. High predicted potential, recommended for priority sourcing.",
                trend.growth * 100.0
            )
        };

        SelectionScore { score, reason }
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{FixedRandom, ScoringEngine, SeededRandom, CAUTION_THRESHOLD};
    use crate::selection::{CategoryTrend, MarketTrends, TrendEntry};

    fn is_two_decimal(value: f64) -> bool {
        ((value * 100.0).round() - value * 100.0).abs() < 1e-9
    }

    #[test]
    fn unknown_category_uses_default_trend() {
        let engine = ScoringEngine::default();
        let scored = engine.score("Outdoor Gear", &mut FixedRandom(0.0));

        // 0.05 * 0.6 + 0.3 * 0.4 = 0.15
        assert!((scored.score - 0.15).abs() < 1e-9);
        assert!(scored.is_cautionary());
        assert!(scored.reason.contains("[Outdoor Gear]"));
        assert!(scored.reason.contains("caution"));
    }

    #[test]
    fn known_category_yields_positive_reason_with_growth_percent() {
        let engine = ScoringEngine::default();
        let scored = engine.score("Baby & Toys", &mut FixedRandom(0.5));

        // 0.15 * 0.6 + 0.6 * 0.4 + 0.05 = 0.38
        assert!((scored.score - 0.38).abs() < 1e-9);
        assert!(!scored.is_cautionary());
        assert!(scored.reason.contains("15.0%"));
    }

    #[test]
    fn scores_stay_within_formula_bounds_and_two_decimals() {
        let trends = MarketTrends::new(
            vec![
                CategoryTrend { category: "max".to_string(), growth: 1.0, competition: 0.0 },
                CategoryTrend { category: "min".to_string(), growth: 0.0, competition: 1.0 },
            ],
            TrendEntry { growth: 0.05, competition: 0.7 },
        );
        let engine = ScoringEngine::new(trends);
        let mut random = SeededRandom::seeded(7);

        for category in ["max", "min", "anything", "Electronics"] {
            for _ in 0..200 {
                let scored = engine.score(category, &mut random);
                assert!((0.0..=1.1).contains(&scored.score), "score out of range: {}", scored.score);
                assert!(is_two_decimal(scored.score), "score not rounded: {}", scored.score);
            }
        }
    }

    #[test]
    fn reason_template_follows_threshold() {
        let engine = ScoringEngine::default();
        let mut random = SeededRandom::seeded(42);

        for category in ["Electronics", "Japanese Home", "Baby & Toys", "Unknown"] {
            for _ in 0..50 {
                let scored = engine.score(category, &mut random);
                let cautionary = scored.reason.contains("caution");
                assert_eq!(cautionary, scored.score < CAUTION_THRESHOLD, "{scored:?}");
            }
        }
    }
}
