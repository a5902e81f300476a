use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::{db_span, map_write_error};
use crate::catalog::{CatalogStatus, CatalogStore, Category, Meal, MealRecord, NewCategory};
use crate::storage::StoreError;

const CATEGORY_COLUMNS: &str = "id, name, description, image, status";
const MEAL_COLUMNS: &str = "id, name, description, price, image, category, status";

#[derive(Clone, Debug)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_from_row(row: &PgRow) -> Result<CatalogStatus, StoreError> {
    let status: String = row.try_get("status")?;
    status
        .parse()
        .map_err(|_| StoreError::Other(anyhow::anyhow!("unknown catalogue status {status:?}")))
}

fn category_from_row(row: &PgRow) -> Result<Category, StoreError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        status: status_from_row(row)?,
    })
}

fn meal_from_row(row: &PgRow) -> Result<Meal, StoreError> {
    Ok(Meal {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        image: row.try_get("image")?,
        category: row.try_get("category")?,
        status: status_from_row(row)?,
    })
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn insert_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let query = format!(
            "INSERT INTO categories (id, name, description, image, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.image)
            .bind(category.status.as_str())
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", &query))
            .await
            .map_err(map_write_error)?;
        category_from_row(&row)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        rows.iter().map(category_from_row).collect()
    }

    async fn find_category(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1");
        let row = sqlx::query(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        row.as_ref().map(category_from_row).transpose()
    }

    async fn insert_meal(&self, meal: MealRecord) -> Result<Meal, StoreError> {
        let query = format!(
            "INSERT INTO meals (id, name, description, price, image, category, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {MEAL_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&meal.name)
            .bind(&meal.description)
            .bind(meal.price)
            .bind(&meal.image)
            .bind(&meal.category)
            .bind(meal.status.as_str())
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", &query))
            .await
            .map_err(map_write_error)?;
        meal_from_row(&row)
    }

    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError> {
        let query = format!("SELECT {MEAL_COLUMNS} FROM meals ORDER BY created_at");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        rows.iter().map(meal_from_row).collect()
    }

    async fn meals_in_category(&self, category: &str) -> Result<Vec<Meal>, StoreError> {
        let query =
            format!("SELECT {MEAL_COLUMNS} FROM meals WHERE category = $1 ORDER BY created_at");
        let rows = sqlx::query(&query)
            .bind(category)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        rows.iter().map(meal_from_row).collect()
    }

    async fn find_meal(&self, id: Uuid) -> Result<Option<Meal>, StoreError> {
        let query = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        row.as_ref().map(meal_from_row).transpose()
    }

    async fn update_meal(&self, id: Uuid, meal: MealRecord) -> Result<Option<Meal>, StoreError> {
        let query = format!(
            "UPDATE meals SET name = $2, description = $3, price = $4, image = $5, \
             category = $6, status = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {MEAL_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(&meal.name)
            .bind(&meal.description)
            .bind(meal.price)
            .bind(&meal.image)
            .bind(&meal.category)
            .bind(meal.status.as_str())
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", &query))
            .await?;
        row.as_ref().map(meal_from_row).transpose()
    }

    async fn delete_meal(&self, id: Uuid) -> Result<bool, StoreError> {
        let query = "DELETE FROM meals WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
