//! Catalog fixtures written on the first request against an empty store.

use crate::entities::{Category, Product, ProductVariant};

pub const VENDOR_AURORA: &str = "f3b9c0d2-5e17-4a8b-9c64-0d2f8a1b7e55";
pub const VENDOR_NORTHWIND: &str = "7a1e9f04-2c3b-4d5e-8f60-1b2c3d4e5f70";

pub fn categories() -> Vec<Category> {
    vec![
        category("c1a6e1b2-9f30-4a11-8f5e-aa01b4c0d001", "Electronics", "electronics"),
        category("c2b7f2c3-0a41-4b22-9a6f-bb12c5d1e002", "Apparel", "apparel"),
        category("c3c8a3d4-1b52-4c33-ab70-cc23d6e2f003", "Home & Kitchen", "home-kitchen"),
        category("c4d9b4e5-2c63-4d44-bc81-dd34e7f30004", "Outdoors", "outdoors"),
    ]
}

pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "a1000001-0000-4000-8000-000000000001".into(),
            name: "Helios Wireless Headphones".into(),
            description: "Over-ear wireless headphones with 40h battery life.".into(),
            price: 129.99,
            images: vec!["https://images.bazaar.dev/helios-headphones.jpg".into()],
            category: "electronics".into(),
            vendor_id: VENDOR_AURORA.into(),
            variants: vec![
                variant("a1000001-var-black", "Color", "Black", "HEL-BK", 0.0, 42),
                variant("a1000001-var-ivory", "Color", "Ivory", "HEL-IV", 10.0, 17),
            ],
            tags: vec!["audio".into(), "wireless".into()],
            rating: 4.6,
            review_count: 218,
        },
        Product {
            id: "a1000002-0000-4000-8000-000000000002".into(),
            name: "Meridian Cotton Tee".into(),
            description: "Heavyweight organic cotton t-shirt.".into(),
            price: 24.0,
            images: vec!["https://images.bazaar.dev/meridian-tee.jpg".into()],
            category: "apparel".into(),
            vendor_id: VENDOR_NORTHWIND.into(),
            variants: vec![
                variant("a1000002-var-s", "Size", "S", "MER-S", 0.0, 80),
                variant("a1000002-var-m", "Size", "M", "MER-M", 0.0, 120),
                variant("a1000002-var-l", "Size", "L", "MER-L", 2.0, 64),
            ],
            tags: vec!["basics".into()],
            rating: 4.2,
            review_count: 97,
        },
        Product {
            id: "a1000003-0000-4000-8000-000000000003".into(),
            name: "Santoku Chef Knife".into(),
            description: "67-layer damascus steel, 18cm blade.".into(),
            price: 89.5,
            images: vec!["https://images.bazaar.dev/santoku-knife.jpg".into()],
            category: "home-kitchen".into(),
            vendor_id: VENDOR_AURORA.into(),
            variants: Vec::new(),
            tags: vec!["kitchen".into(), "steel".into()],
            rating: 4.8,
            review_count: 412,
        },
        Product {
            id: "a1000004-0000-4000-8000-000000000004".into(),
            name: "Ridgeline 2P Tent".into(),
            description: "Three-season two-person tent, 2.1kg packed.".into(),
            price: 199.0,
            images: vec!["https://images.bazaar.dev/ridgeline-tent.jpg".into()],
            category: "outdoors".into(),
            vendor_id: VENDOR_NORTHWIND.into(),
            variants: vec![
                variant("a1000004-var-green", "Color", "Forest Green", "RDG-GR", 0.0, 12),
                variant("a1000004-var-sand", "Color", "Sand", "RDG-SA", 0.0, 9),
            ],
            tags: vec!["camping".into()],
            rating: 4.4,
            review_count: 61,
        },
        Product {
            id: "a1000005-0000-4000-8000-000000000005".into(),
            name: "Ember Travel Mug".into(),
            description: "Vacuum-insulated 350ml mug, leak-proof lid.".into(),
            price: 32.0,
            images: vec!["https://images.bazaar.dev/ember-mug.jpg".into()],
            category: "home-kitchen".into(),
            vendor_id: VENDOR_NORTHWIND.into(),
            variants: Vec::new(),
            tags: vec!["kitchen".into(), "travel".into()],
            rating: 4.0,
            review_count: 33,
        },
    ]
}

fn category(id: &str, name: &str, slug: &str) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        slug: slug.into(),
    }
}

fn variant(id: &str, name: &str, value: &str, sku: &str, price_modifier: f64, stock: i32) -> ProductVariant {
    ProductVariant {
        id: id.into(),
        name: name.into(),
        value: value.into(),
        sku: sku.into(),
        price_modifier,
        stock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fixture_ids_are_unique() {
        let products = products();
        let ids: HashSet<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), products.len());

        let categories = categories();
        let slugs: HashSet<_> = categories.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs.len(), categories.len());
    }

    #[test]
    fn fixture_variants_have_unique_skus_within_product() {
        for product in products() {
            let skus: HashSet<_> = product.variants.iter().map(|v| v.sku.as_str()).collect();
            assert_eq!(skus.len(), product.variants.len(), "{}", product.name);
        }
    }
}
