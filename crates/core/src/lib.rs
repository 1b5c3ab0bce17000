pub mod analytics;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod selection;

pub use analytics::{
    AnalyticsDashboard, CategoryStat, DashboardStats, OrderFact, SalesSummary, TopProduct,
};
pub use catalog::{CatalogQuery, CatalogStore, ProductFilter, SortField, SortKey, TextField};
pub use domain::cart::{CartItem, CartLine, CartSummary};
pub use domain::inventory::{
    InventoryReport, LowStockProduct, PurchaseOrderRequest, RestockRecord, RestockStatus,
    RestockSuggestion,
};
pub use domain::order::{
    Order, OrderId, OrderItemRequest, OrderLine, OrderRequest, OrderStatus, PricedOrder,
};
pub use domain::product::{Product, ProductId, DEFAULT_CATEGORY, DEFAULT_PRODUCT_IMAGE};
pub use domain::review::{NewReview, ProductReview, ReviewId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use selection::{
    CategoryTrend, MarketTrendReport, MarketTrends, ScoringEngine, SelectionExport,
    SelectionService, TrendEntry,
};
