//! Cart and order endpoints, keyed by customer id.
//!
//! - `GET    /api/v1/cart?customer_id=`            - cart summary
//! - `POST   /api/v1/cart`                         - add (accumulates)
//! - `PUT    /api/v1/cart`                         - set quantity (<= 0 removes)
//! - `DELETE /api/v1/cart?customer_id=&product_id=` - remove a line
//! - `POST   /api/v1/orders`                       - place an order
//! - `GET    /api/v1/orders?customer_id=`          - order history, newest first
//! - `GET    /api/v1/orders/{id}`                  - single order

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use storefront_core::domain::cart::CartSummary;
use storefront_core::domain::order::{Order, OrderId, OrderRequest};
use storefront_core::domain::product::ProductId;
use storefront_db::{CartRepository, OrderRepository};
use tracing::info;

use crate::bootstrap::AppState;
use crate::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/cart",
            get(view_cart).post(add_to_cart).put(update_cart).delete(remove_from_cart),
        )
        .route("/api/v1/orders", get(list_orders).post(place_order))
        .route("/api/v1/orders/{id}", get(order_detail))
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerParams {
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CartLineRequest {
    pub customer_id: String,
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{field} is required")))
}

async fn view_cart(
    State(state): State<AppState>,
    Query(params): Query<CustomerParams>,
) -> Result<Json<CartSummary>, ApiError> {
    let customer_id = required(params.customer_id.as_deref(), "customer_id")?;
    Ok(Json(state.carts.summary(customer_id).await?))
}

async fn add_to_cart(
    State(state): State<AppState>,
    Json(body): Json<CartLineRequest>,
) -> Result<(StatusCode, Json<CartSummary>), ApiError> {
    let customer_id = required(Some(body.customer_id.as_str()), "customer_id")?;
    let product_id = ProductId(required(Some(body.product_id.as_str()), "product_id")?.to_string());

    let item = state.carts.add(customer_id, &product_id, body.quantity).await?;
    info!(
        event_name = "cart.item.added",
        product_id = %item.product_id,
        quantity = item.quantity,
        "cart line updated"
    );
    Ok((StatusCode::CREATED, Json(state.carts.summary(customer_id).await?)))
}

async fn update_cart(
    State(state): State<AppState>,
    Json(body): Json<CartLineRequest>,
) -> Result<Json<CartSummary>, ApiError> {
    let customer_id = required(Some(body.customer_id.as_str()), "customer_id")?;
    let product_id = ProductId(required(Some(body.product_id.as_str()), "product_id")?.to_string());

    state.carts.set_quantity(customer_id, &product_id, body.quantity).await?;
    Ok(Json(state.carts.summary(customer_id).await?))
}

async fn remove_from_cart(
    State(state): State<AppState>,
    Query(params): Query<CustomerParams>,
) -> Result<Json<CartSummary>, ApiError> {
    let customer_id = required(params.customer_id.as_deref(), "customer_id")?;
    let product_id = required(params.product_id.as_deref(), "product_id")?;

    if !state.carts.remove(customer_id, &ProductId(product_id.to_string())).await? {
        return Err(ApiError::not_found("cart item", product_id));
    }
    Ok(Json(state.carts.summary(customer_id).await?))
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order_no: String,
    #[serde(flatten)]
    pub order: Order,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self { order_no: order.id.order_no(), order }
    }
}

async fn place_order(
    State(state): State<AppState>,
    Json(body): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    let order = state.orders.place(&body).await?;
    Ok((StatusCode::CREATED, Json(OrderView::from(order))))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<CustomerParams>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let customer_id = required(params.customer_id.as_deref(), "customer_id")?;
    let orders = state.orders.list_for_customer(customer_id).await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

async fn order_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderView>, ApiError> {
    let order = state
        .orders
        .find(OrderId(id))
        .await?
        .ok_or_else(|| ApiError::not_found("order", id.to_string()))?;
    Ok(Json(OrderView::from(order)))
}
