use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CreateOrderRequest, UpdateStatusRequest};
use crate::audit;
use crate::auth::extractors::CurrentUser;
use crate::entities::{CartItem, Order, OrderStatus, Product, Role};
use crate::error::{ApiError, ApiResult};
use crate::response::{ok, ApiResponse};
use crate::state::AppState;
use crate::store::StoreError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/me", get(my_orders))
        .route("/orders/:id/status", patch(update_status))
}

/// Recomputes the order total from authoritative prices: product price plus
/// the chosen variant's modifier, rounded to cents. An empty variant id means
/// the base product.
pub(crate) fn compute_total(products: &[Product], items: &[CartItem]) -> Result<f64, ApiError> {
    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut total = 0.0;
    for item in items {
        if item.quantity == 0 {
            return Err(ApiError::validation("Item quantity must be positive"));
        }
        let product = by_id.get(item.product_id.as_str()).ok_or_else(|| {
            ApiError::validation(format!("Unknown product {}", item.product_id))
        })?;
        let mut unit = product.price;
        if !item.variant_id.is_empty() {
            let variant = product
                .variants
                .iter()
                .find(|v| v.id == item.variant_id)
                .ok_or_else(|| {
                    ApiError::validation(format!(
                        "Unknown variant {} for product {}",
                        item.variant_id, item.product_id
                    ))
                })?;
            unit += variant.price_modifier;
        }
        total += unit * f64::from(item.quantity);
    }
    Ok((total * 100.0).round() / 100.0)
}

#[instrument(skip(state, user, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<Json<ApiResponse<Order>>> {
    if payload.items.is_empty() || payload.shipping_address.is_empty() {
        return Err(ApiError::validation("Missing required order information"));
    }

    let products = state.products().list().await?;
    let total = compute_total(&products, &payload.items)?;
    if let Some(client_total) = payload.total {
        if (client_total - total).abs() > 0.005 {
            return Err(ApiError::validation(
                "Order total does not match current prices",
            ));
        }
    }

    let order = Order {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        items: payload.items,
        total,
        shipping_address: payload.shipping_address,
        status: OrderStatus::Pending,
        created_at: OffsetDateTime::now_utc(),
    };
    let created = state.orders().create(&order).await?;
    info!(order_id = %created.id, user_id = %user.id, total, "order placed");
    Ok(ok(created))
}

#[instrument(skip(state, user))]
pub async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<Order>>>> {
    let mut orders: Vec<Order> = state
        .orders()
        .list()
        .await?
        .into_iter()
        .filter(|o| o.user_id == user.id)
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ok(orders))
}

#[instrument(skip(state, current, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<ApiResponse<Order>>> {
    let actor = current.require_any(&[Role::Employee, Role::Admin])?;

    let updated = state
        .orders()
        .patch(&id, &json!({ "status": payload.status }))
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Order not found"),
            other => other.into(),
        })?;

    audit::record(&state, &actor.id, "order.status", "order", &id).await;
    info!(order_id = %id, status = ?payload.status, actor_id = %actor.id, "order status updated");
    Ok(ok(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ProductVariant;

    fn product(id: &str, price: f64, variants: Vec<ProductVariant>) -> Product {
        Product {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            price,
            images: Vec::new(),
            category: String::new(),
            vendor_id: "v1".into(),
            variants,
            tags: Vec::new(),
            rating: 0.0,
            review_count: 0,
        }
    }

    fn item(product_id: &str, variant_id: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            quantity,
        }
    }

    #[test]
    fn total_sums_base_prices_and_variant_modifiers() {
        let products = vec![
            product(
                "p1",
                10.0,
                vec![ProductVariant {
                    id: "p1-large".into(),
                    name: "Size".into(),
                    value: "Large".into(),
                    sku: "P1-L".into(),
                    price_modifier: 2.5,
                    stock: 5,
                }],
            ),
            product("p2", 4.2, Vec::new()),
        ];
        let items = vec![item("p1", "p1-large", 2), item("p2", "", 3)];
        let total = compute_total(&products, &items).unwrap();
        assert_eq!(total, 2.0 * 12.5 + 3.0 * 4.2);
    }

    #[test]
    fn total_rejects_unknown_products_variants_and_zero_quantities() {
        let products = vec![product("p1", 10.0, Vec::new())];

        assert!(compute_total(&products, &[item("ghost", "", 1)]).is_err());
        assert!(compute_total(&products, &[item("p1", "no-such-variant", 1)]).is_err());
        assert!(compute_total(&products, &[item("p1", "", 0)]).is_err());
    }

    #[test]
    fn total_rounds_to_cents() {
        let products = vec![product("p1", 0.1, Vec::new())];
        let total = compute_total(&products, &[item("p1", "", 3)]).unwrap();
        assert_eq!(total, 0.3);
    }
}
