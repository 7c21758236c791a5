use cartwise_core::domain::product::{ProductId, ProductRecord};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::repositories::{CatalogRepository, RepositoryError};

/// Title and price of the first seeded product. Budget searches such as
/// "jacket under 100" must find it.
pub const CLEARANCE_TITLE: &str = "Men's Black Winter Jacket (Clearance)";
pub const CLEARANCE_PRICE: f64 = 99.0;

pub const PRODUCTS_PER_CATEGORY: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CategoryKind {
    Clothing,
    Footwear,
    Accessories,
    Stationery,
    Electronics,
}

struct SeedCategory {
    name: &'static str,
    kind: CategoryKind,
    gendered: bool,
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory { name: "Winter Jacket", kind: CategoryKind::Clothing, gendered: true },
    SeedCategory { name: "Denim Jeans", kind: CategoryKind::Clothing, gendered: true },
    SeedCategory { name: "Running Shoes", kind: CategoryKind::Footwear, gendered: true },
    SeedCategory { name: "Cotton T-Shirt", kind: CategoryKind::Clothing, gendered: true },
    SeedCategory { name: "Formal Blazer", kind: CategoryKind::Clothing, gendered: true },
    SeedCategory { name: "Sun Hat", kind: CategoryKind::Accessories, gendered: true },
    SeedCategory { name: "Travel Backpack", kind: CategoryKind::Accessories, gendered: false },
    SeedCategory { name: "Graphite Pencil Set", kind: CategoryKind::Stationery, gendered: false },
    SeedCategory { name: "Wireless Earbuds", kind: CategoryKind::Electronics, gendered: false },
    SeedCategory { name: "Sunglasses", kind: CategoryKind::Accessories, gendered: true },
];

const COLORS: &[&str] = &[
    "Red",
    "Navy Blue",
    "Black",
    "Olive Green",
    "Mustard Yellow",
    "White",
    "Maroon",
    "Grey",
    "Cyan",
    "Pink",
];
const CLOTHING_SIZES: &[&str] = &["S", "M", "L", "XL"];
const SHOE_SIZES: &[&str] = &["UK 6", "UK 7", "UK 8", "UK 9", "UK 10"];
const STANDARD_SIZE: &str = "Standard Size";

/// Fixed seed so every run writes the same catalog. ChaCha keeps the stream
/// stable across `rand` releases.
const CATALOG_SEED: u64 = 0x0c47_7715_e5eed;

fn pick(rng: &mut ChaCha8Rng, values: &[&'static str]) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

/// The demo catalog: ten categories with ten products each.
pub struct SeedCatalog;

impl SeedCatalog {
    pub fn products() -> Vec<ProductRecord> {
        let mut rng = ChaCha8Rng::seed_from_u64(CATALOG_SEED);
        let mut products = Vec::with_capacity(CATEGORIES.len() * PRODUCTS_PER_CATEGORY);

        for category in CATEGORIES {
            for position in 0..PRODUCTS_PER_CATEGORY {
                let color = pick(&mut rng, COLORS);
                let gender = match (category.gendered, position < PRODUCTS_PER_CATEGORY / 2) {
                    (false, _) => "Unisex",
                    (true, true) => "Men's",
                    (true, false) => "Women's",
                };
                let size = match category.kind {
                    CategoryKind::Clothing => pick(&mut rng, CLOTHING_SIZES),
                    CategoryKind::Footwear => pick(&mut rng, SHOE_SIZES),
                    _ => STANDARD_SIZE,
                };
                let (low, high) = price_range(category);
                let price = f64::from(rng.gen_range(low..=high));
                let weight_grams: u32 = rng.gen_range(100..=800);
                let stock: u32 = rng.gen_range(0..=50);

                let mut description = format!(
                    "Premium quality {} {} for {}. Perfect for everyday use.",
                    color.to_lowercase(),
                    category.name.to_lowercase(),
                    gender.to_lowercase()
                );
                if size != STANDARD_SIZE {
                    description.push_str(&format!(" Available in size {size}."));
                }
                description.push_str(&format!(" Weight: {weight_grams}g."));

                products.push(ProductRecord {
                    id: ProductId(format!("prod-{:04}", products.len() + 1)),
                    title: format!("{gender} {color} {}", category.name),
                    description,
                    price,
                    category: category.name.to_string(),
                    color: color.to_string(),
                    size: size.to_string(),
                    stock,
                });
            }
        }

        if let Some(first) = products.first_mut() {
            let previous_color = first.color.to_lowercase();
            first.description = first.description.replacen(&previous_color, "black", 1);
            first.title = CLEARANCE_TITLE.to_string();
            first.color = "Black".to_string();
            first.price = CLEARANCE_PRICE;
        }

        products
    }

    /// Writes the catalog, replacing any products with the same ids.
    pub async fn load(repository: &dyn CatalogRepository) -> Result<SeedResult, RepositoryError> {
        let products = Self::products();
        let categories = CATEGORIES.len();
        let products_seeded = repository.save_all(products).await?;
        info!(
            event_name = "catalog.seed.completed",
            products = products_seeded,
            categories,
            "seed catalog written"
        );
        Ok(SeedResult { products_seeded, categories })
    }

    pub async fn verify(
        repository: &dyn CatalogRepository,
    ) -> Result<VerificationResult, RepositoryError> {
        let expected = Self::products();
        let mut checks = Vec::new();

        let count = repository.count().await?;
        checks.push(("product-count", count >= expected.len()));

        let clearance = repository.find_by_id(&expected[0].id).await?;
        checks.push((
            "clearance-item",
            clearance
                .map(|product| product.title == CLEARANCE_TITLE && product.price == CLEARANCE_PRICE)
                .unwrap_or(false),
        ));

        let mut all_categories = true;
        for category in CATEGORIES {
            let sample = expected.iter().find(|product| product.category == category.name);
            let present = match sample {
                Some(product) => repository.find_by_id(&product.id).await?.is_some(),
                None => false,
            };
            all_categories &= present;
        }
        checks.push(("categories", all_categories));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }
}

fn price_range(category: &SeedCategory) -> (u32, u32) {
    match category.kind {
        CategoryKind::Electronics => (1_500, 15_000),
        CategoryKind::Stationery => (50, 500),
        _ if category.name.contains("Jacket") || category.name.contains("Blazer") => {
            (1_500, 5_000)
        }
        CategoryKind::Footwear => (2_000, 4_000),
        _ => (400, 1_500),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub products_seeded: usize,
    pub categories: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{SeedCatalog, CLEARANCE_PRICE, CLEARANCE_TITLE};
    use crate::repositories::{CatalogRepository, InMemoryCatalogRepository, SqlCatalogRepository};
    use crate::{connect_with_settings, migrations};

    #[test]
    fn catalog_is_deterministic_and_complete() {
        let first = SeedCatalog::products();
        let second = SeedCatalog::products();

        assert_eq!(first, second);
        assert_eq!(first.len(), 100);
        let ids = first.iter().map(|product| product.id.0.clone()).collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), 100);
        let categories = first.iter().map(|product| product.category.as_str()).collect::<BTreeSet<_>>();
        assert_eq!(categories.len(), 10);
    }

    #[test]
    fn clearance_jacket_is_the_only_jacket_under_budget() {
        let products = SeedCatalog::products();
        assert_eq!(products[0].title, CLEARANCE_TITLE);
        assert_eq!(products[0].price, CLEARANCE_PRICE);

        let cheap_jackets = products
            .iter()
            .filter(|product| product.category == "Winter Jacket" && product.price <= 100.0)
            .count();
        assert_eq!(cheap_jackets, 1);
    }

    #[test]
    fn prices_follow_category_bands() {
        for product in SeedCatalog::products().iter().skip(1) {
            let (low, high) = match product.category.as_str() {
                "Wireless Earbuds" => (1_500.0, 15_000.0),
                "Graphite Pencil Set" => (50.0, 500.0),
                "Winter Jacket" | "Formal Blazer" => (1_500.0, 5_000.0),
                "Running Shoes" => (2_000.0, 4_000.0),
                _ => (400.0, 1_500.0),
            };
            assert!(
                (low..=high).contains(&product.price),
                "{} priced {} outside {low}..={high}",
                product.title,
                product.price
            );
        }
    }

    #[tokio::test]
    async fn load_is_idempotent_and_verifiable() {
        let repo = InMemoryCatalogRepository::default();
        SeedCatalog::load(&repo).await.expect("first load");
        let result = SeedCatalog::load(&repo).await.expect("second load");

        assert_eq!(result.products_seeded, 100);
        assert_eq!(repo.count().await.expect("count"), 100);
        assert!(SeedCatalog::verify(&repo).await.expect("verify").all_present);
    }

    #[tokio::test]
    async fn load_into_sqlite_catalog() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlCatalogRepository::new(pool);

        SeedCatalog::load(&repo).await.expect("load");
        let verification = SeedCatalog::verify(&repo).await.expect("verify");

        assert!(verification.all_present, "checks: {:?}", verification.checks);
    }

    #[tokio::test]
    async fn verify_reports_missing_catalog() {
        let repo = InMemoryCatalogRepository::default();
        let verification = SeedCatalog::verify(&repo).await.expect("verify");
        assert!(!verification.all_present);
    }
}
