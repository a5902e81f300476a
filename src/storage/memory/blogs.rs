use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::blog::{Blog, BlogRecord, BlogStore};
use crate::storage::StoreError;

#[derive(Debug, Default)]
pub struct MemoryBlogStore {
    blogs: RwLock<Vec<Blog>>,
}

impl MemoryBlogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogStore for MemoryBlogStore {
    async fn insert_blog(&self, blog: BlogRecord) -> Result<Blog, StoreError> {
        let blog = Blog {
            id: Uuid::new_v4(),
            title: blog.title,
            content: blog.content,
            image: blog.image,
            status: blog.status,
            date: Timestamp::now(),
        };
        self.blogs.write().await.push(blog.clone());
        Ok(blog)
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>, StoreError> {
        Ok(self.blogs.read().await.clone())
    }

    async fn find_blog(&self, id: Uuid) -> Result<Option<Blog>, StoreError> {
        Ok(self
            .blogs
            .read()
            .await
            .iter()
            .find(|blog| blog.id == id)
            .cloned())
    }

    async fn update_blog(&self, id: Uuid, blog: BlogRecord) -> Result<Option<Blog>, StoreError> {
        let mut blogs = self.blogs.write().await;
        Ok(blogs.iter_mut().find(|existing| existing.id == id).map(|existing| {
            existing.title = blog.title;
            existing.content = blog.content;
            existing.image = blog.image;
            existing.status = blog.status;
            existing.clone()
        }))
    }

    async fn delete_blog(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut blogs = self.blogs.write().await;
        let before = blogs.len();
        blogs.retain(|blog| blog.id != id);
        Ok(blogs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::BlogStatus;

    fn record(title: &str) -> BlogRecord {
        BlogRecord {
            title: title.to_string(),
            content: "Fresh peas".to_string(),
            image: "memory://blogs/1.png".to_string(),
            status: BlogStatus::Published,
        }
    }

    #[tokio::test]
    async fn update_keeps_id_and_date() -> anyhow::Result<()> {
        let store = MemoryBlogStore::new();
        let created = store.insert_blog(record("Spring menu")).await?;

        let mut changed = record("Summer menu");
        changed.status = BlogStatus::Unpublished;
        let updated = store.update_blog(created.id, changed).await?;

        let updated = updated.ok_or_else(|| anyhow::anyhow!("blog vanished"))?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.title, "Summer menu");
        assert_eq!(updated.status, BlogStatus::Unpublished);
        Ok(())
    }

    #[tokio::test]
    async fn missing_blog_reports_nothing_changed() -> anyhow::Result<()> {
        let store = MemoryBlogStore::new();
        let missing = Uuid::new_v4();
        assert!(store.update_blog(missing, record("Spring menu")).await?.is_none());
        assert!(!store.delete_blog(missing).await?);
        assert!(store.find_blog(missing).await?.is_none());
        Ok(())
    }
}
