use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::BlogError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Published,
    Unpublished,
}

impl BlogStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Unpublished => "unpublished",
        }
    }
}

impl FromStr for BlogStatus {
    type Err = BlogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "published" => Ok(Self::Published),
            "unpublished" => Ok(Self::Unpublished),
            _ => Err(BlogError::Validation(
                "\"status\" must be one of [published, unpublished]".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image: String,
    pub status: BlogStatus,
    /// Creation time, RFC 3339.
    #[schema(value_type = String, format = DateTime)]
    pub date: Timestamp,
}

/// Editable fields, written on create and on update.
#[derive(Clone, Debug)]
pub struct BlogRecord {
    pub title: String,
    pub content: String,
    pub image: String,
    pub status: BlogStatus,
}

/// Text fields of the blog multipart form.
#[derive(Clone, Debug, Default, Validate)]
pub struct BlogForm {
    #[validate(length(min = 3, max = 30, message = "\"title\" must be 3-30 characters"))]
    pub title: String,
    #[validate(length(
        min = 5,
        max = 10000,
        message = "\"content\" must be 5-10000 characters"
    ))]
    pub content: String,
    pub status: String,
}

impl BlogForm {
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            status: self.status.trim().to_string(),
        }
    }
}

/// Body of `POST /api/blogs/send/:id`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Validate)]
pub struct SendBlogRequest {
    #[validate(email(message = "\"email\" must be a valid email"))]
    pub email: String,
}

/// Outcome of mailing a post to every verified account.
#[derive(ToSchema, Serialize, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values() {
        assert!(matches!(
            " published ".parse::<BlogStatus>(),
            Ok(BlogStatus::Published)
        ));
        assert!(matches!(
            "draft".parse::<BlogStatus>(),
            Err(BlogError::Validation(msg)) if msg.contains("published, unpublished")
        ));
    }

    #[test]
    fn form_bounds() {
        let mut form = BlogForm {
            title: "Eat".to_string(),
            content: "Hello".to_string(),
            status: "published".to_string(),
        };
        assert!(form.validate().is_ok());
        form.content = "c".repeat(10_001);
        assert!(form.validate().is_err());
        form.content = "Hello".to_string();
        form.title = "   Ok   ".to_string();
        assert!(form.trimmed().validate().is_err());
    }

    #[test]
    fn date_serializes_as_rfc3339() -> anyhow::Result<()> {
        let blog = Blog {
            id: Uuid::nil(),
            title: "Spring menu".to_string(),
            content: "Fresh peas".to_string(),
            image: "memory://blogs/1.png".to_string(),
            status: BlogStatus::Published,
            date: "2024-03-01T12:00:00Z".parse()?,
        };
        let value = serde_json::to_value(&blog)?;
        assert_eq!(value["date"], "2024-03-01T12:00:00Z");
        assert_eq!(value["status"], "published");
        Ok(())
    }
}
