use rust_decimal::Decimal;

use storefront_core::domain::product::Product;

use crate::connection::DbPool;
use crate::repositories::{RepositoryError, SqlProductRepository};

/// Upper bound on generated catalog rows.
const MAX_SAMPLE_PRODUCTS: usize = 100;

const VARIANT_SUFFIXES: [&str; 3] = ["", " Pro", " Lite"];

struct SampleTemplate {
    name: &'static str,
    min_price: i64,
    max_price: i64,
    image_url: &'static str,
}

const fn template(
    name: &'static str,
    min_price: i64,
    max_price: i64,
    image_url: &'static str,
) -> SampleTemplate {
    SampleTemplate { name, min_price, max_price, image_url }
}

/// Sample catalog across the five storefront categories. Every template
/// expands to three variants.
const SAMPLE_CATEGORIES: &[(&str, &[SampleTemplate])] = &[
    (
        "Digital Accessories",
        &[
            template("Bluetooth Headphones", 150, 500, "https://images.unsplash.com/photo-1590658268037-6bf12165a8df?w=800"),
            template("Wireless Charger", 80, 300, "https://images.unsplash.com/photo-1601784551446-20c9e07cdbdb?w=800"),
            template("Phone Case", 30, 150, "https://images.unsplash.com/photo-1601972602237-8c79241e468b?w=800"),
            template("USB-C Cable", 25, 100, "https://images.unsplash.com/photo-1587825140708-dfaf72ae4b04?w=800"),
            template("Power Bank", 100, 400, "https://images.unsplash.com/photo-1609091839311-d5365f9ff1c7?w=800"),
            template("Car Charger", 50, 200, "https://images.unsplash.com/photo-1601784551446-20c9e07cdbdb?w=800"),
        ],
    ),
    (
        "Smart Wearables",
        &[
            template("Smart Band", 150, 400, "https://images.unsplash.com/photo-1557438159-51eec7a6c9e8?w=800"),
            template("Smart Watch", 500, 2000, "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=800"),
            template("Sports Earbuds", 200, 600, "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=800"),
            template("Health Monitor", 300, 800, "https://images.unsplash.com/photo-1559757148-5c350d0d3c56?w=800"),
        ],
    ),
    (
        "Computer Peripherals",
        &[
            template("Mechanical Keyboard", 300, 800, "https://images.unsplash.com/photo-1595225476474-87563907a212?w=800"),
            template("Wireless Mouse", 80, 300, "https://images.unsplash.com/photo-1527814050087-3793815479db?w=800"),
            template("Gaming Mouse", 200, 600, "https://images.unsplash.com/photo-1527814050087-3793815479db?w=800"),
            template("Monitor", 800, 3000, "https://images.unsplash.com/photo-1527443224154-c4a3942d3acf?w=800"),
            template("USB Dock", 100, 400, "https://images.unsplash.com/photo-1587825140708-dfaf72ae4b04?w=800"),
            template("Webcam", 200, 800, "https://images.unsplash.com/photo-1606983340126-99ab4feaa64a?w=800"),
            template("Desktop Speaker", 300, 1200, "https://images.unsplash.com/photo-1608043152269-423dbba4e7e1?w=800"),
        ],
    ),
    (
        "Smart Home",
        &[
            template("Smart Speaker", 200, 600, "https://images.unsplash.com/photo-1589492477829-5e65395b66cc?w=800"),
            template("Smart Light Bulb", 50, 200, "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=800"),
            template("Smart Plug", 60, 250, "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=800"),
            template("Smart Door Lock", 500, 1500, "https://images.unsplash.com/photo-1600063296531-28d2c8e8e0a0?w=800"),
            template("Security Camera", 200, 800, "https://images.unsplash.com/photo-1606983340126-99ab4feaa64a?w=800"),
            template("Air Purifier", 400, 1500, "https://images.unsplash.com/photo-1585771724684-38269d6639fd?w=800"),
        ],
    ),
    (
        "Daily Essentials",
        &[
            template("Insulated Bottle", 50, 200, "https://images.unsplash.com/photo-1602143407151-7111542de6e8?w=800"),
            template("Electric Toothbrush", 100, 400, "https://images.unsplash.com/photo-1607613009820-a29f7bb81c04?w=800"),
            template("Humidifier", 150, 500, "https://images.unsplash.com/photo-1585771724684-38269d6639fd?w=800"),
            template("Desk Lamp", 80, 300, "https://images.unsplash.com/photo-1507473885765-e6ed057f782c?w=800"),
            template("Bathroom Scale", 80, 300, "https://images.unsplash.com/photo-1559757148-5c350d0d3c56?w=800"),
        ],
    ),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub created: usize,
    pub updated: usize,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}

/// Deterministic sample catalog. Loading upserts by SKU, so it can be run
/// repeatedly against the same database.
pub struct SampleCatalog;

impl SampleCatalog {
    pub fn products() -> Vec<Product> {
        let mut products = Vec::new();
        let mut number = 1usize;

        'outer: for (category, templates) in SAMPLE_CATEGORIES {
            for template in templates.iter() {
                for (variant, suffix) in VARIANT_SUFFIXES.iter().enumerate() {
                    if number > MAX_SAMPLE_PRODUCTS {
                        break 'outer;
                    }
                    products.push(sample_product(number, category, template, variant, suffix));
                    number += 1;
                }
            }
        }

        products
    }

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let repo = SqlProductRepository::new(pool.clone());
        let mut result = SeedResult::default();

        for mut product in Self::products() {
            match repo.find_by_sku(&product.sku).await? {
                Some(existing) => {
                    product.id = existing.id;
                    result.updated += 1;
                }
                None => result.created += 1,
            }
            repo.upsert(&product).await?;
        }

        Ok(result)
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let repo = SqlProductRepository::new(pool.clone());
        let mut checks = Vec::new();

        for product in Self::products() {
            let present = repo.find_by_sku(&product.sku).await?.is_some();
            checks.push((product.sku, present));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

fn sample_product(
    number: usize,
    category: &str,
    template: &SampleTemplate,
    variant: usize,
    suffix: &str,
) -> Product {
    let seed = number as i64;
    let span = template.max_price - template.min_price;
    let price = template.min_price + span * (variant as i64 + 1) / 4;
    let sku = format!("PROD-{number:03}");
    let name = format!("{}{suffix}", template.name);

    let mut product = Product::new(
        format!("prod-{number:03}"),
        sku,
        name.clone(),
        category,
        Decimal::from(price),
    );
    product.original_price = (seed % 3 != 0).then(|| Decimal::from(price + 50 + (seed * 37) % 150));
    product.stock = 50 + (seed * 53) % 450;
    product.image_url = Some(template.image_url.to_string());
    product.description = format!("High quality {name} with reliable performance.");
    product.rating = 4.0 + ((seed * 7) % 11) as f64 / 10.0;
    product.sales_count = 1_000 + (seed * 997) % 19_000;
    product
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{SampleCatalog, MAX_SAMPLE_PRODUCTS};
    use crate::{connect_with_settings, migrations};

    #[test]
    fn sample_catalog_is_bounded_and_unique() {
        let products = SampleCatalog::products();

        assert!(!products.is_empty());
        assert!(products.len() <= MAX_SAMPLE_PRODUCTS);

        let skus = products.iter().map(|product| product.sku.clone()).collect::<HashSet<_>>();
        assert_eq!(skus.len(), products.len());

        let categories =
            products.iter().map(|product| product.category.clone()).collect::<HashSet<_>>();
        assert_eq!(categories.len(), 5);

        assert!(products.iter().all(|product| (4.0..=5.0).contains(&product.rating)));
        assert!(products.iter().all(|product| product.stock >= 50));
    }

    #[tokio::test]
    async fn loading_twice_updates_instead_of_duplicating() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let first = SampleCatalog::load(&pool).await.expect("first load");
        let second = SampleCatalog::load(&pool).await.expect("second load");

        assert_eq!(first.created, SampleCatalog::products().len());
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, first.created);

        let verification = SampleCatalog::verify(&pool).await.expect("verify");
        assert!(verification.all_present);
    }
}
