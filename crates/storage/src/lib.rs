use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;
use tracing::debug;

use shared::domain::{Product, ProductFields, ProductId};

pub const SEED_PRODUCT_COUNT: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("product {0} not found")]
pub struct ProductNotFound(pub ProductId);

/// Persistence seam used by the action layer.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    async fn create_product(&self, fields: &ProductFields) -> Result<Product>;

    /// Fails with [`ProductNotFound`] when `id` does not exist.
    async fn update_product(&self, id: ProductId, fields: &ProductFields) -> Result<Product>;

    /// Fails with [`ProductNotFound`] when `id` does not exist.
    async fn delete_product(&self, id: ProductId) -> Result<Product>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
    latency: Duration,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool_options = if is_memory_url(database_url) {
            // every connection to an in-memory url is a separate database
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self {
            pool,
            latency: Duration::ZERO,
        })
    }

    /// Delay applied before every product query, used to exercise pending states.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts the baseline catalog when the table is empty and returns the
    /// number of rows written. The emptiness check and the insert are one
    /// statement.
    pub async fn seed_if_empty(&self) -> Result<u64> {
        let mut query = sqlx::query(
            "WITH seed(title, price, description) AS (
                 VALUES (?, ?, ?), (?, ?, ?), (?, ?, ?), (?, ?, ?)
             )
             INSERT INTO products (title, price, description)
             SELECT title, price, description FROM seed
             WHERE NOT EXISTS (SELECT 1 FROM products)",
        );
        for fields in seed_products() {
            query = query
                .bind(fields.title)
                .bind(fields.price)
                .bind(fields.description);
        }
        let result = query
            .execute(&self.pool)
            .await
            .context("failed to seed products")?;
        debug!(inserted = result.rows_affected(), "product seed finished");
        Ok(result.rows_affected())
    }

    pub async fn count_products(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.simulate_latency().await;
        let rows = sqlx::query("SELECT id, title, price, description FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        self.simulate_latency().await;
        let row = sqlx::query("SELECT id, title, price, description FROM products WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    pub async fn create_product(&self, fields: &ProductFields) -> Result<Product> {
        self.simulate_latency().await;
        let row = sqlx::query(
            "INSERT INTO products (title, price, description) VALUES (?, ?, ?)
             RETURNING id, title, price, description",
        )
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.description)
        .fetch_one(&self.pool)
        .await?;
        product_from_row(&row)
    }

    pub async fn update_product(&self, id: ProductId, fields: &ProductFields) -> Result<Product> {
        self.simulate_latency().await;
        let row = sqlx::query(
            "UPDATE products SET title = ?, price = ?, description = ? WHERE id = ?
             RETURNING id, title, price, description",
        )
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.description)
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ProductNotFound(id))?;
        product_from_row(&row)
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<Product> {
        self.simulate_latency().await;
        let row = sqlx::query(
            "DELETE FROM products WHERE id = ? RETURNING id, title, price, description",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ProductNotFound(id))?;
        product_from_row(&row)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl ProductStore for Storage {
    async fn list_products(&self) -> Result<Vec<Product>> {
        Storage::list_products(self).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Storage::get_product(self, id).await
    }

    async fn create_product(&self, fields: &ProductFields) -> Result<Product> {
        Storage::create_product(self, fields).await
    }

    async fn update_product(&self, id: ProductId, fields: &ProductFields) -> Result<Product> {
        Storage::update_product(self, id, fields).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<Product> {
        Storage::delete_product(self, id).await
    }
}

/// "Product N", N x 100, "Description N" for N in 1..=4.
pub fn seed_products() -> Vec<ProductFields> {
    (1..=SEED_PRODUCT_COUNT)
        .map(|n| ProductFields::new(format!("Product {n}"), n * 100, format!("Description {n}")))
        .collect()
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    Ok(Product {
        id: ProductId(row.try_get::<i64, _>("id")?),
        title: row.try_get("title")?,
        price: row.try_get("price")?,
        description: row.try_get("description")?,
    })
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
