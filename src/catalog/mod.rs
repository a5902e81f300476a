//! Menu catalogue: categories and the meals filed under them.
//!
//! Reads are public. Writes arrive as multipart forms from admins; the image
//! part is checked (type, size) before anything is uploaded or persisted, and
//! a meal may only reference a category that exists.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::StoreError;

mod service;
mod types;
pub mod uploads;

pub use service::CatalogService;
pub use types::{
    CatalogStatus, Category, CategoryForm, ImageUpload, Meal, MealForm, MealRecord, NewCategory,
};
pub use uploads::{LocalObjectStore, MemoryObjectStore, ObjectStore};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} already exists.")]
    Conflict(&'static str),
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("image upload failed: {0:#}")]
    Upload(#[source] anyhow::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the name is taken.
    async fn insert_category(&self, category: NewCategory) -> Result<Category, StoreError>;
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn find_category(&self, name: &str) -> Result<Option<Category>, StoreError>;
    async fn insert_meal(&self, meal: MealRecord) -> Result<Meal, StoreError>;
    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError>;
    async fn meals_in_category(&self, category: &str) -> Result<Vec<Meal>, StoreError>;
    async fn find_meal(&self, id: Uuid) -> Result<Option<Meal>, StoreError>;
    async fn update_meal(&self, id: Uuid, meal: MealRecord) -> Result<Option<Meal>, StoreError>;
    async fn delete_meal(&self, id: Uuid) -> Result<bool, StoreError>;
}
