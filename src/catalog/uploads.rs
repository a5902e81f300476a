//! Image uploads.
//!
//! The catalogue only needs "put these bytes somewhere and give me a URL";
//! [`LocalObjectStore`] writes under a directory the HTTP server exposes at
//! `/uploads`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;
use ulid::Ulid;

use super::{CatalogError, ImageUpload};

pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;
const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `folder` and return the public URL.
    async fn upload(&self, bytes: Vec<u8>, folder: &str, content_type: &str) -> Result<String>;
}

/// Reject anything that is not a jpeg/png of at most 1 MiB.
///
/// # Errors
/// Returns [`CatalogError::Validation`] with the user-facing reason.
pub fn check_image(image: &ImageUpload) -> Result<(), CatalogError> {
    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Err(CatalogError::Validation(
            "Only jpeg, jpg and png files are allowed.".to_string(),
        ));
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(CatalogError::Validation(
            "Image size should be less than 1MB.".to_string(),
        ));
    }
    Ok(())
}

fn extension(content_type: &str) -> &'static str {
    if content_type == "image/png" {
        "png"
    } else {
        "jpg"
    }
}

#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    #[must_use]
    pub fn new(root: PathBuf, public_base_url: &str) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, bytes: Vec<u8>, folder: &str, content_type: &str) -> Result<String> {
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create upload dir {}", dir.display()))?;

        let file_name = format!(
            "{}.{}",
            Ulid::new().to_string().to_lowercase(),
            extension(content_type)
        );
        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!(path = %path.display(), "stored upload");
        Ok(format!("{}/uploads/{folder}/{file_name}", self.public_base_url))
    }
}

/// Keeps uploads in memory; URLs use the `memory://` scheme.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn urls(&self) -> Vec<String> {
        self.objects
            .lock()
            .await
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, bytes: Vec<u8>, folder: &str, content_type: &str) -> Result<String> {
        let url = format!(
            "memory://{folder}/{}.{}",
            Ulid::new().to_string().to_lowercase(),
            extension(content_type)
        );
        self.objects.lock().await.push((url.clone(), bytes));
        Ok(url)
    }
}
