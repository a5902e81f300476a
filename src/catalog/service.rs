use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{
    CatalogError, CatalogStatus, CatalogStore, Category, CategoryForm, ImageUpload, Meal,
    MealForm, MealRecord, NewCategory,
    uploads::{ObjectStore, check_image},
};
use crate::{auth::first_error, storage::StoreError};

const CATEGORY_FOLDER: &str = "categories";
const MEAL_FOLDER: &str = "meals";

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    objects: Arc<dyn ObjectStore>,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// # Errors
    /// `Validation` for bad fields or image, `Conflict` for a taken name.
    #[instrument(skip_all)]
    pub async fn create_category(
        &self,
        form: CategoryForm,
        image: Option<ImageUpload>,
    ) -> Result<Category, CatalogError> {
        let form = form.trimmed();
        validate(&form)?;
        let status: CatalogStatus = form.status.parse()?;
        let image = require_image(image)?;

        let url = self.upload(image, CATEGORY_FOLDER).await?;
        let category = self
            .store
            .insert_category(NewCategory {
                name: form.name,
                description: form.description,
                image: url,
                status,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict => CatalogError::Conflict("Category"),
                other => CatalogError::Store(other),
            })?;

        info!(category = %category.name, "category created");
        Ok(category)
    }

    /// # Errors
    /// Store failures only.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.store.list_categories().await?)
    }

    /// Meals filed under the named category.
    ///
    /// # Errors
    /// `NotFound` if no category has that name.
    pub async fn meals_by_category(&self, name: &str) -> Result<Vec<Meal>, CatalogError> {
        let category = self.require_category(name).await?;
        Ok(self.store.meals_in_category(&category.name).await?)
    }

    /// # Errors
    /// `Validation`, or `NotFound` for an unknown category.
    #[instrument(skip_all)]
    pub async fn create_meal(
        &self,
        form: MealForm,
        image: Option<ImageUpload>,
    ) -> Result<Meal, CatalogError> {
        let form = form.trimmed();
        validate(&form)?;
        let status: CatalogStatus = form.status.parse()?;
        let image = require_image(image)?;
        let category = self.require_category(&form.category).await?;

        let url = self.upload(image, MEAL_FOLDER).await?;
        let meal = self
            .store
            .insert_meal(MealRecord {
                name: form.name,
                description: form.description,
                price: form.price,
                image: url,
                category: category.name,
                status,
            })
            .await?;

        info!(meal_id = %meal.id, "meal created");
        Ok(meal)
    }

    /// # Errors
    /// Store failures only.
    pub async fn list_meals(&self) -> Result<Vec<Meal>, CatalogError> {
        Ok(self.store.list_meals().await?)
    }

    /// # Errors
    /// `NotFound` for an unknown id.
    pub async fn get_meal(&self, id: Uuid) -> Result<Meal, CatalogError> {
        self.store
            .find_meal(id)
            .await?
            .ok_or(CatalogError::NotFound("Meal"))
    }

    /// Replace every field of a meal. Without a new image the current one is kept.
    ///
    /// # Errors
    /// `Validation`, or `NotFound` for an unknown meal or category.
    #[instrument(skip(self, form, image))]
    pub async fn update_meal(
        &self,
        id: Uuid,
        form: MealForm,
        image: Option<ImageUpload>,
    ) -> Result<Meal, CatalogError> {
        let form = form.trimmed();
        validate(&form)?;
        let status: CatalogStatus = form.status.parse()?;
        if let Some(image) = &image {
            check_image(image)?;
        }

        let current = self.get_meal(id).await?;
        let category = self.require_category(&form.category).await?;

        let url = match image {
            Some(image) => self.upload(image, MEAL_FOLDER).await?,
            None => current.image,
        };

        self.store
            .update_meal(
                id,
                MealRecord {
                    name: form.name,
                    description: form.description,
                    price: form.price,
                    image: url,
                    category: category.name,
                    status,
                },
            )
            .await?
            .ok_or(CatalogError::NotFound("Meal"))
    }

    /// # Errors
    /// `NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_meal(&self, id: Uuid) -> Result<(), CatalogError> {
        if self.store.delete_meal(id).await? {
            info!("meal deleted");
            Ok(())
        } else {
            Err(CatalogError::NotFound("Meal"))
        }
    }

    async fn require_category(&self, name: &str) -> Result<Category, CatalogError> {
        self.store
            .find_category(name.trim())
            .await?
            .ok_or(CatalogError::NotFound("Category"))
    }

    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<String, CatalogError> {
        self.objects
            .upload(image.bytes, folder, &image.content_type)
            .await
            .map_err(CatalogError::Upload)
    }
}

fn validate(input: &impl Validate) -> Result<(), CatalogError> {
    input
        .validate()
        .map_err(|errors| CatalogError::Validation(first_error(&errors)))
}

fn require_image(image: Option<ImageUpload>) -> Result<ImageUpload, CatalogError> {
    let image =
        image.ok_or_else(|| CatalogError::Validation("Please upload an image".to_string()))?;
    check_image(&image)?;
    Ok(image)
}
