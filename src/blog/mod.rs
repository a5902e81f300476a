//! Blog posts written by admins.
//!
//! Anyone can read published and unpublished posts alike; the status is a
//! label for the frontend. A post can be mailed to one address or to every
//! verified account. Images go through the same checks and object store as
//! catalogue images, under the `blogs` folder.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::StoreError;

mod service;
mod types;

pub use service::BlogService;
pub use types::{Blog, BlogForm, BlogRecord, BlogStatus, DeliveryReport, SendBlogRequest};

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("{0}")]
    Validation(String),
    #[error("Blog not found.")]
    NotFound,
    #[error("image upload failed: {0:#}")]
    Upload(#[source] anyhow::Error),
    #[error("email delivery failed: {0:#}")]
    Delivery(#[source] anyhow::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Persist a new post; the store stamps its `date`.
    async fn insert_blog(&self, blog: BlogRecord) -> Result<Blog, StoreError>;
    async fn list_blogs(&self) -> Result<Vec<Blog>, StoreError>;
    async fn find_blog(&self, id: Uuid) -> Result<Option<Blog>, StoreError>;
    /// Replace the editable fields. `date` keeps its original value.
    async fn update_blog(&self, id: Uuid, blog: BlogRecord) -> Result<Option<Blog>, StoreError>;
    async fn delete_blog(&self, id: Uuid) -> Result<bool, StoreError>;
}
