use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::entities::{Category, Product};
use crate::error::{ApiError, ApiResult};
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/categories", get(list_categories))
}

/// The public catalog seeds fixture data the first time it is read.
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    let store = state.products();
    store.ensure_seed().await?;
    Ok(ok(store.list().await?))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = state
        .products()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(ok(product))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Category>>>> {
    let store = state.categories();
    store.ensure_seed().await?;
    Ok(ok(store.list().await?))
}
