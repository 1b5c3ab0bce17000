use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Conversational purpose inferred from keyword presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Recommend,
    Discount,
    Inquiry,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recommend => "RECOMMEND",
            Self::Discount => "DISCOUNT",
            Self::Inquiry => "INQUIRY",
        }
    }
}

const RECOMMEND_TERMS: &[&str] = &[
    "recommend",
    "what to buy",
    "pick",
    "suggest",
    "want",
    "need",
    "looking for",
    "推荐",
    "买什么",
    "挑选",
    "选品",
    "想要",
    "需要",
];

const DISCOUNT_TERMS: &[&str] = &[
    "price",
    "discount",
    "deal",
    "promotion",
    "cheap",
    "价格",
    "优惠",
    "折扣",
    "促销",
    "便宜",
];

const INQUIRY_TERMS: &[&str] =
    &["feature", "spec", "parameter", "功能", "特点", "参数", "规格"];

/// Checked in order; the first rule with a matching term decides.
static INTENT_RULES: LazyLock<Vec<(Intent, Vec<Term>)>> = LazyLock::new(|| {
    vec![
        (Intent::Recommend, Term::compile_all(RECOMMEND_TERMS)),
        (Intent::Discount, Term::compile_all(DISCOUNT_TERMS)),
        (Intent::Inquiry, Term::compile_all(INQUIRY_TERMS)),
    ]
});

/// Category names recognised in messages. Checked before product types.
const CATEGORY_TERMS: &[&str] = &[
    "digital accessories",
    "smart wearables",
    "computer peripherals",
    "smart home",
    "daily essentials",
    "数码配件",
    "智能穿戴",
    "电脑外设",
    "智能家居",
    "生活用品",
];

const PRODUCT_TYPE_TERMS: &[&str] = &[
    "headphones",
    "earphones",
    "charger",
    "wristband",
    "keyboard",
    "mouse",
    "speaker",
    "light bulb",
    "camera",
    "耳机",
    "充电器",
    "手环",
    "键盘",
    "鼠标",
    "音箱",
    "灯泡",
    "摄像头",
];

/// Categories first, then product types, each in vocabulary order.
static KEYWORD_TERMS: LazyLock<Vec<Term>> = LazyLock::new(|| {
    CATEGORY_TERMS.iter().chain(PRODUCT_TYPE_TERMS.iter()).copied().map(Term::compile).collect()
});

/// One vocabulary term prepared for matching against normalized text.
///
/// Latin terms must stand as whole words (a trailing `s`/`es` plural is
/// accepted), so "deal" does not fire inside "ideal". Terms containing CJK
/// characters match as plain substrings since that script has no word
/// separators.
#[derive(Clone, Debug)]
pub(crate) struct Term {
    text: &'static str,
    word: Option<Regex>,
}

impl Term {
    pub(crate) fn compile(text: &'static str) -> Self {
        let word = text.is_ascii().then(|| {
            Regex::new(&format!(
                r"(?:^|[^a-z0-9]){}(?:s|es)?(?:$|[^a-z0-9])",
                regex::escape(text)
            ))
            .expect("escaped vocabulary term is a valid pattern")
        });
        Self { text, word }
    }

    pub(crate) fn compile_all(texts: &[&'static str]) -> Vec<Self> {
        texts.iter().copied().map(Self::compile).collect()
    }

    pub(crate) fn text(&self) -> &'static str {
        self.text
    }

    /// `normalized` must already be lower-cased.
    pub(crate) fn is_mentioned_in(&self, normalized: &str) -> bool {
        match &self.word {
            Some(word) => word.is_match(normalized),
            None => normalized.contains(self.text),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedIntent {
    pub intent: Intent,
    /// Matched category and product-type terms, lower-cased, categories
    /// first, each in vocabulary order.
    pub keywords: Vec<String>,
}

/// Fixed-vocabulary intent and keyword extraction. Matching folds case on
/// both sides, so "Headphones" and "headphones" are the same term.
#[derive(Clone, Debug, Default)]
pub struct IntentExtractor;

impl IntentExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> ExtractedIntent {
        let normalized = normalize_text(text);
        ExtractedIntent { intent: classify(&normalized), keywords: extract_keywords(&normalized) }
    }

    pub fn intent(&self, text: &str) -> Intent {
        classify(&normalize_text(text))
    }

    pub fn keywords(&self, text: &str) -> Vec<String> {
        extract_keywords(&normalize_text(text))
    }
}

pub(crate) fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

fn contains_any(normalized: &str, terms: &[Term]) -> bool {
    terms.iter().any(|term| term.is_mentioned_in(normalized))
}

fn classify(normalized: &str) -> Intent {
    INTENT_RULES
        .iter()
        .find(|(_, terms)| contains_any(normalized, terms))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Inquiry)
}

fn extract_keywords(normalized: &str) -> Vec<String> {
    KEYWORD_TERMS
        .iter()
        .filter(|term| term.is_mentioned_in(normalized))
        .map(|term| term.text().to_string())
        .collect()
}
