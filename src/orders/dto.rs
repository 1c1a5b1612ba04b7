use std::collections::HashMap;

use serde::Deserialize;

use crate::entities::{CartItem, OrderStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: HashMap<String, String>,
    /// Client-side figure, checked against the server's recomputation.
    #[serde(default)]
    pub total: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}
