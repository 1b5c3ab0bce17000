use std::collections::BTreeMap;

use tokio::sync::RwLock;

use storefront_core::catalog::{CatalogQuery, CatalogStore};
use storefront_core::domain::product::{Product, ProductId};
use storefront_core::errors::ApplicationError;

/// Catalog held in memory, evaluated with [`CatalogQuery::apply`]. Iteration
/// is by id so ties sort the same way as the SQL store.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let repo = Self::default();
        {
            let mut guard = repo.products.write().await;
            for product in products {
                guard.insert(product.id.clone(), product);
            }
        }
        repo
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryProductRepository {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<Product>, ApplicationError> {
        let products = self.products.read().await;
        Ok(query.apply(products.values().cloned()))
    }

    async fn count(&self, query: &CatalogQuery) -> Result<usize, ApplicationError> {
        let products = self.products.read().await;
        Ok(products.values().filter(|product| query.matches(product)).count())
    }

    async fn find(&self, id: &ProductId) -> Result<Option<Product>, ApplicationError> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    async fn save(&self, product: Product) -> Result<(), ApplicationError> {
        let mut products = self.products.write().await;
        products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn update_selection(
        &self,
        id: &ProductId,
        potential_score: f64,
        selection_reason: &str,
    ) -> Result<(), ApplicationError> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(id) {
            product.potential_score = potential_score;
            product.selection_reason = selection_reason.to_string();
        }
        Ok(())
    }
}
