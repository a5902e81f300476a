//! Catalogue records and the forms that create them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::CatalogError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    Available,
    Unavailable,
}

impl CatalogStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }
}

impl FromStr for CatalogStatus {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            _ => Err(CatalogError::Validation(
                "\"status\" must be one of [available, unavailable]".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub status: CatalogStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    /// Name of the owning category.
    pub category: String,
    pub status: CatalogStatus,
}

#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub image: String,
    pub status: CatalogStatus,
}

/// Fields written on meal create and on full update.
#[derive(Clone, Debug)]
pub struct MealRecord {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub category: String,
    pub status: CatalogStatus,
}

/// Text fields of the category multipart form.
#[derive(Clone, Debug, Default, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 5, max = 30, message = "\"name\" must be 5-30 characters"))]
    pub name: String,
    #[validate(length(
        min = 5,
        max = 255,
        message = "\"description\" must be 5-255 characters"
    ))]
    pub description: String,
    pub status: String,
}

impl CategoryForm {
    /// Strip surrounding whitespace so length rules see the stored value.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status.trim().to_string(),
        }
    }
}

/// Text fields of the meal multipart form.
#[derive(Clone, Debug, Default, Validate)]
pub struct MealForm {
    #[validate(length(min = 3, max = 30, message = "\"name\" must be 3-30 characters"))]
    pub name: String,
    #[validate(length(
        min = 5,
        max = 255,
        message = "\"description\" must be 5-255 characters"
    ))]
    pub description: String,
    #[validate(range(min = 0.0, max = 1000.0, message = "\"price\" must be between 0 and 1000"))]
    pub price: f64,
    pub category: String,
    pub status: String,
}

impl MealForm {
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            status: self.status.trim().to_string(),
            ..self
        }
    }
}

/// An uploaded file as received from the client.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}
