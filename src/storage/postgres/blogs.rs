use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::{db_span, map_write_error};
use crate::blog::{Blog, BlogRecord, BlogStatus, BlogStore};
use crate::storage::StoreError;

// `date` is read back as RFC 3339 text.
const BLOG_COLUMNS: &str = "id, title, content, image, status, \
     to_char(blogs.date AT TIME ZONE 'utc', 'YYYY-MM-DD\"T\"HH24:MI:SS.US\"Z\"') AS date";

#[derive(Clone, Debug)]
pub struct PgBlogStore {
    pool: PgPool,
}

impl PgBlogStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn blog_from_row(row: &PgRow) -> Result<Blog, StoreError> {
    let status: String = row.try_get("status")?;
    let status: BlogStatus = status
        .parse()
        .map_err(|_| StoreError::Other(anyhow::anyhow!("unknown blog status {status:?}")))?;
    let date: String = row.try_get("date")?;
    let date = date
        .parse()
        .map_err(|err| StoreError::Other(anyhow::anyhow!("bad blog date {date:?}: {err}")))?;
    Ok(Blog {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        image: row.try_get("image")?,
        status,
        date,
    })
}

#[async_trait]
impl BlogStore for PgBlogStore {
    async fn insert_blog(&self, blog: BlogRecord) -> Result<Blog, StoreError> {
        let query = format!(
            "INSERT INTO blogs (id, title, content, image, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {BLOG_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&blog.title)
            .bind(&blog.content)
            .bind(&blog.image)
            .bind(blog.status.as_str())
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", &query))
            .await
            .map_err(map_write_error)?;
        blog_from_row(&row)
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>, StoreError> {
        let query = format!("SELECT {BLOG_COLUMNS} FROM blogs ORDER BY blogs.date");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        rows.iter().map(blog_from_row).collect()
    }

    async fn find_blog(&self, id: Uuid) -> Result<Option<Blog>, StoreError> {
        let query = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        row.as_ref().map(blog_from_row).transpose()
    }

    async fn update_blog(&self, id: Uuid, blog: BlogRecord) -> Result<Option<Blog>, StoreError> {
        let query = format!(
            "UPDATE blogs SET title = $2, content = $3, image = $4, status = $5, \
             updated_at = NOW() WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(&blog.title)
            .bind(&blog.content)
            .bind(&blog.image)
            .bind(blog.status.as_str())
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", &query))
            .await?;
        row.as_ref().map(blog_from_row).transpose()
    }

    async fn delete_blog(&self, id: Uuid) -> Result<bool, StoreError> {
        let query = "DELETE FROM blogs WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
