//! Seed the catalog with development data.
//!
//! Inserts a couple of stores and a handful of products so the storefront
//! has something to sell locally. Idempotent: stores upsert on slug and
//! products are skipped when their SKU already exists for the store.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

struct SeedStore {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    products: &'static [SeedProduct],
}

struct SeedProduct {
    name: &'static str,
    sku: &'static str,
    price_cents: i64,
    stock: i32,
}

const SEED_STORES: &[SeedStore] = &[
    SeedStore {
        name: "Aurora Ceramics",
        slug: "aurora-ceramics",
        description: "Small-batch stoneware from the north coast.",
        products: &[
            SeedProduct {
                name: "Speckled Mug",
                sku: "AC-MUG-01",
                price_cents: 2400,
                stock: 40,
            },
            SeedProduct {
                name: "Serving Bowl",
                sku: "AC-BOWL-03",
                price_cents: 5200,
                stock: 12,
            },
        ],
    },
    SeedStore {
        name: "Fern & Field",
        slug: "fern-and-field",
        description: "Botanical prints and paper goods.",
        products: &[
            SeedProduct {
                name: "Meadow Print A3",
                sku: "FF-PRNT-A3",
                price_cents: 1800,
                stock: 100,
            },
            SeedProduct {
                name: "Notebook Set",
                sku: "FF-NTBK-02",
                price_cents: 1500,
                stock: 0,
            },
        ],
    },
];

/// Seed stores and products for development.
///
/// # Errors
///
/// Returns an error if the database URL is missing or a query fails.
pub async fn catalog() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .map_err(|_| "STOREFRONT_DATABASE_URL not set")?;

    let pool = PgPool::connect(&database_url).await?;

    for store in SEED_STORES {
        let (store_id,): (i32,) = sqlx::query_as(
            "INSERT INTO storefront.store (name, slug, description, owner_user_id) \
             VALUES ($1, $2, $3, 0) \
             ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id",
        )
        .bind(store.name)
        .bind(store.slug)
        .bind(store.description)
        .fetch_one(&pool)
        .await?;

        for product in store.products {
            let inserted = sqlx::query(
                "INSERT INTO storefront.product \
                   (store_id, name, sku, unit_price, stock_quantity) \
                 SELECT $1, $2, $3, $4, $5 \
                 WHERE NOT EXISTS ( \
                     SELECT 1 FROM storefront.product \
                     WHERE store_id = $1 AND sku = $3 \
                 )",
            )
            .bind(store_id)
            .bind(product.name)
            .bind(product.sku)
            .bind(Decimal::new(product.price_cents, 2))
            .bind(product.stock)
            .execute(&pool)
            .await?;

            if inserted.rows_affected() > 0 {
                info!(store = store.slug, sku = product.sku, "Seeded product");
            }
        }

        info!(store = store.slug, "Seeded store");
    }

    Ok(())
}
