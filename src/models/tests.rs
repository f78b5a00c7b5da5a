#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_new() {
    let cat = Category::new("Sneakers".into());
    assert!(cat.id.is_none());
    assert_eq!(cat.name, "Sneakers");
    assert!(!cat.created_at.is_empty());
}

#[test]
fn test_category_display() {
    let cat = Category::new("Boots".into());
    assert_eq!(format!("{cat}"), "Boots");
}

#[test]
fn test_category_find_by_name_case_insensitive() {
    let cats = vec![
        Category::new("Sneakers".into()),
        Category::new("Boots".into()),
    ];
    let found = Category::find_by_name(&cats, "SNEAKERS").unwrap();
    assert_eq!(found.name, "Sneakers");
    assert!(Category::find_by_name(&cats, "Sandals").is_none());
}

// ── Product ───────────────────────────────────────────────────

#[test]
fn test_product_new() {
    let cat = Category::new("Sneakers".into());
    let product = Product::new("SK-001".into(), "Runner".into(), dec!(59.99), cat);
    assert!(product.id.is_none());
    assert_eq!(product.code, "SK-001");
    assert_eq!(product.name, "Runner");
    assert_eq!(product.price, dec!(59.99));
    assert_eq!(product.category.name, "Sneakers");
    assert!(!product.created_at.is_empty());
}

#[test]
fn test_product_display() {
    let cat = Category::new("Sneakers".into());
    let product = Product::new("SK-001".into(), "Runner".into(), dec!(1.00), cat);
    assert_eq!(format!("{product}"), "Runner (SK-001)");
}
