use axum::extract::State;
use rust_decimal::Decimal;
use storefront_agent::gateway::GatewaySettings;
use storefront_agent::{AdvisoryGateway, ShoppingAssistant};
use storefront_core::catalog::CatalogStore;
use storefront_core::domain::product::Product;
use storefront_core::selection::{FixedRandom, ScoringEngine, SelectionService};
use storefront_db::{connect_with_settings, migrations, SqlProductRepository};

use crate::bootstrap::AppState;

pub fn product(id: &str, name: &str, category: &str, price_cents: i64, stock: i64, sales: i64) -> Product {
    let mut product =
        Product::new(id, id.to_uppercase(), name, category, Decimal::new(price_cents, 2));
    product.stock = stock;
    product.sales_count = sales;
    product
}

/// In-memory database with a small catalog and a deterministic scorer.
pub async fn seeded_state() -> AppState {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");

    let catalog = SqlProductRepository::new(pool.clone());
    for product in [
        product("prod-1", "Bluetooth Headphones", "Digital Accessories", 19900, 10, 500),
        product("prod-2", "Mechanical Keyboard", "Computer Peripherals", 39900, 3, 900),
        product("prod-3", "Smart Speaker", "Smart Home", 29900, 0, 1200),
        product("prod-4", "Desk Lamp", "Daily Essentials", 8000, 20, 50),
    ] {
        catalog.save(product).await.expect("save product");
    }

    let selection = SelectionService::with_random(
        ScoringEngine::default(),
        10,
        Box::new(FixedRandom(0.5)),
    );
    let gateway = AdvisoryGateway::local(
        ShoppingAssistant::default(),
        GatewaySettings {
            model: "google/gemini-2.5-flash".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        },
    );

    AppState::new(pool, selection, gateway)
}

pub fn state(app: &AppState) -> State<AppState> {
    State(app.clone())
}
