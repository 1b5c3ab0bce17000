//! Catalog query model shared by every catalog consumer.
//!
//! A [`CatalogQuery`] is a conjunction of [`ProductFilter`]s, an ordered list
//! of [`SortKey`]s and an optional page window. Storage backends translate it
//! to their own query language; [`CatalogQuery::apply`] is the reference
//! in-memory evaluation.

use std::cmp::Ordering;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::ApplicationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Name,
    Sku,
    Category,
    Description,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProductFilter {
    /// Any of `terms` appears in any of `fields`, ignoring case.
    TextContainsAny { fields: Vec<TextField>, terms: Vec<String> },
    /// Either any term appears in the name or the category equals `category`.
    NameOrCategory { name_term: String, category: String },
    CategoryEquals(String),
    PriceAtLeast(Decimal),
    PriceAtMost(Decimal),
    StockAbove(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Price,
    PotentialScore,
    SalesCount,
    Rating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl SortKey {
    pub const fn asc(field: SortField) -> Self {
        Self { field, descending: false }
    }

    pub const fn desc(field: SortField) -> Self {
        Self { field, descending: true }
    }

    /// Parses an allow-listed ordering token such as `-potential_score`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, raw),
        };
        let field = match name {
            "price" => SortField::Price,
            "potential_score" => SortField::PotentialScore,
            "sales_count" => SortField::SalesCount,
            "rating" => SortField::Rating,
            _ => return None,
        };
        Some(Self { field, descending })
    }

    fn compare(&self, left: &Product, right: &Product) -> Ordering {
        let ordering = match self.field {
            SortField::Price => left.price.cmp(&right.price),
            SortField::PotentialScore => left.potential_score.total_cmp(&right.potential_score),
            SortField::SalesCount => left.sales_count.cmp(&right.sales_count),
            SortField::Rating => left.rating.total_cmp(&right.rating),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub filters: Vec<ProductFilter>,
    pub sort: Vec<SortKey>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: ProductFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Same filters without the page window; used for total counts.
    pub fn unpaged(&self) -> Self {
        Self { filters: self.filters.clone(), sort: Vec::new(), offset: 0, limit: None }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.filters.iter().all(|filter| filter_matches(filter, product))
    }

    /// Filters, sorts (stable, ties keep input order) and pages `products`.
    pub fn apply(&self, products: impl IntoIterator<Item = Product>) -> Vec<Product> {
        let mut selected =
            products.into_iter().filter(|product| self.matches(product)).collect::<Vec<_>>();
        selected.sort_by(|left, right| {
            self.sort
                .iter()
                .map(|key| key.compare(left, right))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        let window = selected.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        }
    }
}

fn field_value(product: &Product, field: TextField) -> &str {
    match field {
        TextField::Name => &product.name,
        TextField::Sku => &product.sku,
        TextField::Category => &product.category,
        TextField::Description => &product.description,
    }
}

fn filter_matches(filter: &ProductFilter, product: &Product) -> bool {
    match filter {
        ProductFilter::TextContainsAny { fields, terms } => {
            let lowered_terms = terms
                .iter()
                .map(|term| term.to_lowercase())
                .filter(|term| !term.is_empty())
                .collect::<Vec<_>>();
            fields.iter().any(|field| {
                let haystack = field_value(product, *field).to_lowercase();
                lowered_terms.iter().any(|term| haystack.contains(term.as_str()))
            })
        }
        ProductFilter::NameOrCategory { name_term, category } => {
            product.name.to_lowercase().contains(&name_term.to_lowercase())
                || product.category.to_lowercase() == category.to_lowercase()
        }
        ProductFilter::CategoryEquals(category) => {
            product.category.to_lowercase() == category.to_lowercase()
        }
        ProductFilter::PriceAtLeast(bound) => product.price >= *bound,
        ProductFilter::PriceAtMost(bound) => product.price <= *bound,
        ProductFilter::StockAbove(threshold) => product.stock > *threshold,
    }
}

/// The catalog datastore every component reads and the ranking pass writes.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<Product>, ApplicationError>;

    async fn count(&self, query: &CatalogQuery) -> Result<usize, ApplicationError>;

    async fn find(&self, id: &ProductId) -> Result<Option<Product>, ApplicationError>;

    async fn save(&self, product: Product) -> Result<(), ApplicationError>;

    /// Overwrites only the selection fields so concurrent stock writes survive.
    async fn update_selection(
        &self,
        id: &ProductId,
        potential_score: f64,
        selection_reason: &str,
    ) -> Result<(), ApplicationError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CatalogQuery, ProductFilter, SortField, SortKey, TextField};
    use crate::domain::product::Product;

    fn product(id: &str, name: &str, category: &str, score: f64, sales: i64) -> Product {
        let mut product = Product::new(id, id.to_uppercase(), name, category, Decimal::new(1000, 2));
        product.potential_score = score;
        product.sales_count = sales;
        product.stock = 5;
        product
    }

    fn fixture() -> Vec<Product> {
        vec![
            product("p1", "Bluetooth Headphones", "Digital Accessories", 0.4, 10),
            product("p2", "Mechanical Keyboard", "Computer Peripherals", 0.9, 3),
            product("p3", "Smart Speaker", "Smart Home", 0.4, 50),
        ]
    }

    #[test]
    fn text_filter_is_case_insensitive_and_or_combined() {
        let query = CatalogQuery::new().filter(ProductFilter::TextContainsAny {
            fields: vec![TextField::Name, TextField::Category],
            terms: vec!["HEADPHONES".to_string(), "smart home".to_string()],
        });

        let ids = query.apply(fixture()).into_iter().map(|p| p.id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec!["p1".to_string(), "p3".to_string()]);
    }

    #[test]
    fn multi_key_sort_breaks_ties_in_order() {
        let query = CatalogQuery::new()
            .sort_by(SortKey::desc(SortField::PotentialScore))
            .sort_by(SortKey::desc(SortField::SalesCount));

        let ids = query.apply(fixture()).into_iter().map(|p| p.id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec!["p2".to_string(), "p3".to_string(), "p1".to_string()]);
    }

    #[test]
    fn page_window_applies_after_sorting() {
        let query = CatalogQuery::new().sort_by(SortKey::desc(SortField::SalesCount)).offset(1).limit(1);

        let page = query.apply(fixture());
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id.0, "p1");
    }

    #[test]
    fn ordering_tokens_follow_allow_list() {
        assert_eq!(SortKey::parse("-price"), Some(SortKey::desc(SortField::Price)));
        assert_eq!(SortKey::parse("rating"), Some(SortKey::asc(SortField::Rating)));
        assert_eq!(SortKey::parse("name"), None);
        assert_eq!(SortKey::parse("--price"), None);
    }

    #[test]
    fn name_or_category_matches_either_side() {
        let query = CatalogQuery::new().filter(ProductFilter::NameOrCategory {
            name_term: "keyboard".to_string(),
            category: "smart home".to_string(),
        });

        assert_eq!(query.apply(fixture()).len(), 2);
    }
}
