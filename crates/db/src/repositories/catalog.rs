use sqlx::Row;

use cartwise_core::domain::product::{ProductId, ProductRecord};

use super::{CatalogRepository, RepositoryError};
use crate::DbPool;

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, price, category, color, size, stock FROM products";

const UPSERT_PRODUCT: &str =
    "INSERT INTO products (id, title, description, price, category, color, size, stock)
     VALUES (?, ?, ?, ?, ?, ?, ?, ?)
     ON CONFLICT(id) DO UPDATE SET
         title = excluded.title,
         description = excluded.description,
         price = excluded.price,
         category = excluded.category,
         color = excluded.color,
         size = excluded.size,
         stock = excluded.stock,
         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<ProductRecord, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let title: String = row.try_get("title").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price: f64 = row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: String =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let color: String = row.try_get("color").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let size: String = row.try_get("size").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let stock: i64 = row.try_get("stock").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let stock = u32::try_from(stock)
        .map_err(|_| RepositoryError::Decode(format!("product `{id}` has invalid stock {stock}")))?;

    Ok(ProductRecord {
        id: ProductId(id),
        title,
        description,
        price,
        category,
        color,
        size,
        stock,
    })
}

#[async_trait::async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<ProductRecord>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn save(&self, product: ProductRecord) -> Result<(), RepositoryError> {
        sqlx::query(UPSERT_PRODUCT)
            .bind(&product.id.0)
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.category)
            .bind(&product.color)
            .bind(&product.size)
            .bind(i64::from(product.stock))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_all(&self, products: Vec<ProductRecord>) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        for product in &products {
            sqlx::query(UPSERT_PRODUCT)
                .bind(&product.id.0)
                .bind(&product.title)
                .bind(&product.description)
                .bind(product.price)
                .bind(&product.category)
                .bind(&product.color)
                .bind(&product.size)
                .bind(i64::from(product.stock))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(products.len())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM products")
            .fetch_one(&self.pool)
            .await?;
        usize::try_from(count).map_err(|_| RepositoryError::Decode(format!("invalid count {count}")))
    }
}
