pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_config, connect_with_settings, ping, DbPool};
pub use fixtures::{SampleCatalog, SeedResult, VerificationResult};
pub use repositories::{
    AnalyticsRepository, CartRepository, InMemoryProductRepository, InventoryRepository,
    OrderRepository, RepositoryError, ReviewRepository, SqlAnalyticsRepository,
    SqlCartRepository, SqlInventoryRepository, SqlOrderRepository, SqlProductRepository,
    SqlReviewRepository,
};
