use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::{
    Blog, BlogError, BlogForm, BlogRecord, BlogStatus, BlogStore, DeliveryReport, SendBlogRequest,
};
use crate::{
    auth::{CredentialStore, first_error},
    catalog::{ImageUpload, ObjectStore, uploads::check_image},
    email::{EmailMessage, EmailSender, templates},
};

const BLOG_FOLDER: &str = "blogs";

pub struct BlogService {
    store: Arc<dyn BlogStore>,
    objects: Arc<dyn ObjectStore>,
    readers: Arc<dyn CredentialStore>,
    mailer: Arc<dyn EmailSender>,
}

impl BlogService {
    #[must_use]
    pub fn new(
        store: Arc<dyn BlogStore>,
        objects: Arc<dyn ObjectStore>,
        readers: Arc<dyn CredentialStore>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            store,
            objects,
            readers,
            mailer,
        }
    }

    /// # Errors
    /// `Validation` for bad fields or a missing/invalid image.
    #[instrument(skip_all)]
    pub async fn create(
        &self,
        form: BlogForm,
        image: Option<ImageUpload>,
    ) -> Result<Blog, BlogError> {
        let form = form.trimmed();
        validate(&form)?;
        let status: BlogStatus = form.status.parse()?;
        let image =
            image.ok_or_else(|| BlogError::Validation("Please upload an image".to_string()))?;
        checked(&image)?;

        let url = self.upload(image).await?;
        let blog = self
            .store
            .insert_blog(BlogRecord {
                title: form.title,
                content: form.content,
                image: url,
                status,
            })
            .await?;

        info!(blog_id = %blog.id, "blog created");
        Ok(blog)
    }

    /// # Errors
    /// Store failures only.
    pub async fn list(&self) -> Result<Vec<Blog>, BlogError> {
        Ok(self.store.list_blogs().await?)
    }

    /// # Errors
    /// `NotFound` for an unknown id.
    pub async fn get(&self, id: Uuid) -> Result<Blog, BlogError> {
        self.store.find_blog(id).await?.ok_or(BlogError::NotFound)
    }

    /// Replace title, content and status. Without a new image the current one is kept.
    ///
    /// # Errors
    /// `Validation`, or `NotFound` for an unknown id.
    #[instrument(skip(self, form, image))]
    pub async fn update(
        &self,
        id: Uuid,
        form: BlogForm,
        image: Option<ImageUpload>,
    ) -> Result<Blog, BlogError> {
        let form = form.trimmed();
        validate(&form)?;
        let status: BlogStatus = form.status.parse()?;
        if let Some(image) = &image {
            checked(image)?;
        }

        let current = self.get(id).await?;
        let url = match image {
            Some(image) => self.upload(image).await?,
            None => current.image,
        };

        self.store
            .update_blog(
                id,
                BlogRecord {
                    title: form.title,
                    content: form.content,
                    image: url,
                    status,
                },
            )
            .await?
            .ok_or(BlogError::NotFound)
    }

    /// # Errors
    /// `NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), BlogError> {
        if self.store.delete_blog(id).await? {
            info!("blog deleted");
            Ok(())
        } else {
            Err(BlogError::NotFound)
        }
    }

    /// Mail one post to a single address.
    ///
    /// # Errors
    /// `Validation`, `NotFound`, or `Delivery` when the send fails.
    #[instrument(skip(self, request))]
    pub async fn send(&self, id: Uuid, request: SendBlogRequest) -> Result<(), BlogError> {
        let request = SendBlogRequest {
            email: request.email.trim().to_string(),
        };
        validate(&request)?;
        let blog = self.get(id).await?;

        self.mailer
            .send(&newsletter(&blog, request.email))
            .await
            .map_err(BlogError::Delivery)
    }

    /// Mail one post to every verified account. Individual failures are
    /// logged and counted; they do not stop the remaining sends.
    ///
    /// # Errors
    /// `NotFound`, or a store failure while listing recipients.
    #[instrument(skip(self))]
    pub async fn send_all(&self, id: Uuid) -> Result<DeliveryReport, BlogError> {
        let blog = self.get(id).await?;
        let recipients = self.readers.verified_emails().await?;

        let mut report = DeliveryReport::default();
        for email in recipients {
            match self.mailer.send(&newsletter(&blog, email)).await {
                Ok(()) => report.sent += 1,
                Err(err) => {
                    warn!("blog email not sent: {err:#}");
                    report.failed += 1;
                }
            }
        }

        info!(sent = report.sent, failed = report.failed, "blog mailed to readers");
        Ok(report)
    }

    async fn upload(&self, image: ImageUpload) -> Result<String, BlogError> {
        self.objects
            .upload(image.bytes, BLOG_FOLDER, &image.content_type)
            .await
            .map_err(BlogError::Upload)
    }
}

fn newsletter(blog: &Blog, to: String) -> EmailMessage {
    let (subject, html_body) = templates::blog_post(&blog.title, &blog.content, &blog.image);
    EmailMessage {
        to,
        subject,
        html_body,
    }
}

fn validate(input: &impl Validate) -> Result<(), BlogError> {
    input
        .validate()
        .map_err(|errors| BlogError::Validation(first_error(&errors)))
}

fn checked(image: &ImageUpload) -> Result<(), BlogError> {
    check_image(image).map_err(|err| BlogError::Validation(err.to_string()))
}
