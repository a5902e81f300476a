//! Category and meal endpoints. Writes take `multipart/form-data`.

use axum::extract::{Extension, Multipart, Path};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::response::{ApiError, ApiResponse};
use crate::catalog::{
    CatalogError, CatalogService, CatalogStatus, Category, CategoryForm, ImageUpload, Meal,
    MealForm,
};

/// Multipart body of `POST /api/categories`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CategoryUpload {
    name: String,
    description: String,
    status: CatalogStatus,
    /// jpeg or png, at most 1 MiB.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Multipart body of meal create and update. On update `image` is optional.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct MealUpload {
    name: String,
    description: String,
    price: f64,
    category: String,
    status: CatalogStatus,
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Text fields and optional image of a multipart write.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    fields: HashMap<String, String>,
    pub(crate) image: Option<ImageUpload>,
}

impl UploadForm {
    pub(crate) fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }

    fn category(&mut self) -> CategoryForm {
        CategoryForm {
            name: self.take("name"),
            description: self.take("description"),
            status: self.take("status"),
        }
    }

    fn meal(&mut self) -> Result<MealForm, ApiError> {
        let price = self
            .take("price")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| ApiError::bad_request("\"price\" must be a number"))?;
        Ok(MealForm {
            name: self.take("name"),
            description: self.take("description"),
            price,
            category: self.take("category"),
            status: self.take("status"),
        })
    }
}

pub(crate) async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let invalid = |err: axum::extract::multipart::MultipartError| {
        ApiError::bad_request(format!("Invalid form data: {err}"))
    };

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(invalid)?;
            // Browsers send an empty part when no file was picked.
            if !bytes.is_empty() {
                form.image = Some(ImageUpload {
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field.text().await.map_err(invalid)?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

fn meal_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::from(CatalogError::NotFound("Meal")))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body(content = CategoryUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid fields or image, or name taken"),
        (status = 401, description = "Caller is not a verified admin")
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
pub async fn create_category(
    catalog: Extension<Arc<CatalogService>>,
    multipart: Multipart,
) -> Result<ApiResponse<Category>, ApiError> {
    let mut form = read_form(multipart).await?;
    let category = catalog
        .create_category(form.category(), form.image.take())
        .await?;
    Ok(ApiResponse::created("Category created successfully.").data(category))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories", body = [Category])),
    tag = "catalog"
)]
pub async fn list_categories(
    catalog: Extension<Arc<CatalogService>>,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    let categories = catalog.list_categories().await?;
    Ok(ApiResponse::ok("Categories fetched successfully.").data(categories))
}

#[utoipa::path(
    get,
    path = "/api/categories/{name}",
    params(("name" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Meals in the category", body = [Meal]),
        (status = 404, description = "Category not found")
    ),
    tag = "catalog"
)]
pub async fn meals_by_category(
    catalog: Extension<Arc<CatalogService>>,
    Path(name): Path<String>,
) -> Result<ApiResponse<Vec<Meal>>, ApiError> {
    let meals = catalog.meals_by_category(&name).await?;
    Ok(ApiResponse::ok("Meals fetched successfully.").data(meals))
}

#[utoipa::path(
    post,
    path = "/api/meals",
    request_body(content = MealUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Meal created", body = Meal),
        (status = 400, description = "Invalid fields or image"),
        (status = 401, description = "Caller is not a verified admin"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
pub async fn create_meal(
    catalog: Extension<Arc<CatalogService>>,
    multipart: Multipart,
) -> Result<ApiResponse<Meal>, ApiError> {
    let mut form = read_form(multipart).await?;
    let meal = catalog.create_meal(form.meal()?, form.image.take()).await?;
    Ok(ApiResponse::created("Meal created successfully.").data(meal))
}

#[utoipa::path(
    get,
    path = "/api/meals",
    responses((status = 200, description = "All meals", body = [Meal])),
    tag = "catalog"
)]
pub async fn list_meals(
    catalog: Extension<Arc<CatalogService>>,
) -> Result<ApiResponse<Vec<Meal>>, ApiError> {
    let meals = catalog.list_meals().await?;
    Ok(ApiResponse::ok("Meals fetched successfully.").data(meals))
}

#[utoipa::path(
    get,
    path = "/api/meals/{id}",
    params(("id" = String, Path, description = "Meal id")),
    responses(
        (status = 200, description = "The meal", body = Meal),
        (status = 404, description = "Meal not found")
    ),
    tag = "catalog"
)]
pub async fn get_meal(
    catalog: Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Meal>, ApiError> {
    let meal = catalog.get_meal(meal_id(&id)?).await?;
    Ok(ApiResponse::ok("Meal fetched successfully.").data(meal))
}

#[utoipa::path(
    put,
    path = "/api/meals/{id}",
    params(("id" = String, Path, description = "Meal id")),
    request_body(content = MealUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Meal updated", body = Meal),
        (status = 400, description = "Invalid fields or image"),
        (status = 401, description = "Caller is not a verified admin"),
        (status = 404, description = "Meal or category not found")
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
pub async fn update_meal(
    catalog: Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<ApiResponse<Meal>, ApiError> {
    let id = meal_id(&id)?;
    let mut form = read_form(multipart).await?;
    let meal = catalog
        .update_meal(id, form.meal()?, form.image.take())
        .await?;
    Ok(ApiResponse::ok("Meal updated successfully.").data(meal))
}

#[utoipa::path(
    delete,
    path = "/api/meals/{id}",
    params(("id" = String, Path, description = "Meal id")),
    responses(
        (status = 200, description = "Meal deleted"),
        (status = 401, description = "Caller is not a verified admin"),
        (status = 404, description = "Meal not found")
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
pub async fn delete_meal(
    catalog: Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    catalog.delete_meal(meal_id(&id)?).await?;
    Ok(ApiResponse::ok("Meal deleted successfully."))
}
