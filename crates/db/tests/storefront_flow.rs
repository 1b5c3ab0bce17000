use std::collections::HashSet;

use storefront_core::catalog::{CatalogQuery, CatalogStore, ProductFilter};
use storefront_core::domain::order::{OrderItemRequest, OrderRequest};
use storefront_core::selection::{ScoringEngine, SeededRandom, SelectionService};
use storefront_db::{
    connect_with_settings, migrations, CartRepository, OrderRepository, SampleCatalog,
    SqlCartRepository, SqlOrderRepository, SqlProductRepository,
};

type FlowTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

async fn seeded_pool() -> FlowTestResult<storefront_db::DbPool> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect failed: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate failed: {error}"))?;
    SampleCatalog::load(&pool).await.map_err(|error| format!("seed failed: {error}"))?;
    Ok(pool)
}

#[tokio::test]
async fn ranking_pass_scores_every_seeded_product() -> FlowTestResult {
    let pool = seeded_pool().await?;
    let catalog = SqlProductRepository::new(pool);
    let service = SelectionService::with_random(
        ScoringEngine::default(),
        10,
        Box::new(SeededRandom::seeded(11)),
    );

    let top = service
        .generate_recommendations(&catalog)
        .await
        .map_err(|error| format!("ranking failed: {error}"))?;
    require!(top.len() == 10, "expected 10 ranked products, got {}", top.len());
    require!(
        top.windows(2).all(|pair| pair[0].potential_score >= pair[1].potential_score),
        "ranking must be sorted by potential score"
    );

    let all = catalog
        .query(&CatalogQuery::new())
        .await
        .map_err(|error| format!("query failed: {error}"))?;
    require!(all.len() == SampleCatalog::products().len());
    require!(
        all.iter().all(|product| product.potential_score > 0.0 && !product.selection_reason.is_empty()),
        "every product must carry a score and a reason after ranking"
    );
    Ok(())
}

#[tokio::test]
async fn cart_to_order_flow_decrements_stock() -> FlowTestResult {
    let pool = seeded_pool().await?;
    let catalog = SqlProductRepository::new(pool.clone());
    let carts = SqlCartRepository::new(pool.clone());
    let orders = SqlOrderRepository::new(pool);

    let headphones = catalog
        .query(&CatalogQuery::new().filter(ProductFilter::CategoryEquals(
            "digital accessories".to_string(),
        )))
        .await
        .map_err(|error| format!("query failed: {error}"))?;
    require!(!headphones.is_empty(), "seeded catalog should contain digital accessories");
    let product = headphones[0].clone();

    carts
        .add("cust-flow", &product.id, 2)
        .await
        .map_err(|error| format!("add to cart failed: {error}"))?;
    let cart = carts.summary("cust-flow").await.map_err(|error| format!("cart failed: {error}"))?;
    require!(cart.total_quantity == 2);

    let request = OrderRequest {
        customer_id: "cust-flow".to_string(),
        items: cart
            .items
            .iter()
            .map(|line| OrderItemRequest { product_id: line.product_id.clone(), quantity: line.quantity })
            .collect(),
        shipping_address: "12 Harbour Road".to_string(),
        source: Some("ai_guide".to_string()),
    };
    let order = orders.place(&request).await.map_err(|error| format!("order failed: {error}"))?;
    require!(order.total_amount == cart.total_amount, "order total should match cart total");
    require!(order.id.order_no().starts_with("OD") && order.id.order_no().len() == 10);

    let after = catalog
        .find(&product.id)
        .await
        .map_err(|error| format!("find failed: {error}"))?
        .ok_or_else(|| "product vanished".to_string())?;
    require!(after.stock == product.stock - 2, "stock should drop by the ordered quantity");
    Ok(())
}

#[tokio::test]
async fn sample_catalog_covers_five_categories() -> FlowTestResult {
    let pool = seeded_pool().await?;
    let catalog = SqlProductRepository::new(pool);

    let products = catalog
        .query(&CatalogQuery::new())
        .await
        .map_err(|error| format!("query failed: {error}"))?;
    let categories = products.iter().map(|product| product.category.as_str()).collect::<HashSet<_>>();
    require!(categories.len() == 5, "expected five categories, got {categories:?}");
    Ok(())
}
