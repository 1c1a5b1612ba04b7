use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::seed;
use crate::store::Entity;

/// Wire format follows the storefront contract: camelCase field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    /// Axis name, e.g. "Color" or "Size".
    pub name: String,
    /// Axis value, e.g. "Red" or "Large".
    pub value: String,
    pub sku: String,
    pub price_modifier: f64,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub vendor_id: String,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

impl Entity for Product {
    const KIND: &'static str = "product";
    const INDEX: &'static str = "products";

    fn storage_key(&self) -> String {
        self.id.clone()
    }

    fn seed() -> Vec<Self> {
        seed::products()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl Entity for Category {
    const KIND: &'static str = "category";
    const INDEX: &'static str = "categories";

    fn storage_key(&self) -> String {
        self.id.clone()
    }

    fn seed() -> Vec<Self> {
        seed::categories()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Vendor,
    Admin,
    Employee,
}

impl Default for Role {
    fn default() -> Self {
        Role::Buyer
    }
}

/// Stored user record. Keyed by lowercased email so registration and login
/// share one lookup; the argon2 hash never leaves the store layer (the public
/// projection lives in `auth::dto::PublicUser`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
}

impl Entity for StoredUser {
    const KIND: &'static str = "user";
    const INDEX: &'static str = "users";

    fn storage_key(&self) -> String {
        self.email.to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub variant_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub total: f64,
    #[serde(default)]
    pub shipping_address: HashMap<String, String>,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for Order {
    const KIND: &'static str = "order";
    const INDEX: &'static str = "orders";

    fn storage_key(&self) -> String {
        self.id.clone()
    }
}

/// Append-only: audit records are created and listed, never patched or
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub actor_id: String,
    pub action: String,
    pub target_id: String,
    pub target_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for AuditLog {
    const KIND: &'static str = "audit";
    const INDEX: &'static str = "audits";

    fn storage_key(&self) -> String {
        self.id.clone()
    }
}
