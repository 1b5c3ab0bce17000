//! Product selection: market-trend driven potential scoring and ranking.
//!
//! - `scoring` computes one product's potential score and justification.
//! - `ranking` re-scores the whole catalog and returns the top entries.
//! - `report` renders the trend report and the analysis export records.

pub mod ranking;
pub mod report;
pub mod scoring;

use serde::{Deserialize, Serialize};

pub use ranking::SelectionService;
pub use report::{MarketTrendReport, ProductAnalysisRecord, SelectionExport, SelectionExportEntry};
pub use scoring::{FixedRandom, RandomSource, ScoringEngine, SeededRandom, SelectionScore};

pub const DEFAULT_GROWTH: f64 = 0.05;
pub const DEFAULT_COMPETITION: f64 = 0.7;
pub const DEFAULT_TOP_N: usize = 10;

/// Category-level market parameters, both in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub growth: f64,
    pub competition: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub category: String,
    pub growth: f64,
    pub competition: f64,
}

/// Trend table injected into the scoring engine. Unknown categories resolve
/// to `fallback`.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketTrends {
    entries: Vec<CategoryTrend>,
    fallback: TrendEntry,
}

impl Default for MarketTrends {
    fn default() -> Self {
        Self::new(
            vec![
                CategoryTrend { category: "Baby & Toys".to_string(), growth: 0.15, competition: 0.4 },
                CategoryTrend {
                    category: "Japanese Home".to_string(),
                    growth: 0.08,
                    competition: 0.6,
                },
                CategoryTrend { category: "Electronics".to_string(), growth: 0.20, competition: 0.8 },
            ],
            TrendEntry { growth: DEFAULT_GROWTH, competition: DEFAULT_COMPETITION },
        )
    }
}

impl MarketTrends {
    pub fn new(entries: Vec<CategoryTrend>, fallback: TrendEntry) -> Self {
        Self { entries, fallback }
    }

    pub fn lookup(&self, category: &str) -> TrendEntry {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| TrendEntry { growth: entry.growth, competition: entry.competition })
            .unwrap_or(self.fallback)
    }

    pub fn entries(&self) -> &[CategoryTrend] {
        &self.entries
    }

    pub fn fallback(&self) -> TrendEntry {
        self.fallback
    }
}
