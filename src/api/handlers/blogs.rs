//! Blog endpoints. Create and update take `multipart/form-data`; the send
//! routes mail a post and take JSON or no body at all.

use axum::extract::{Extension, Multipart, Path};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::{UploadForm, read_form};
use super::users::{Payload, require_payload};
use crate::api::response::{ApiError, ApiResponse};
use crate::blog::{
    Blog, BlogError, BlogForm, BlogService, BlogStatus, DeliveryReport, SendBlogRequest,
};

/// Multipart body of blog create and update. On update `image` is optional.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BlogUpload {
    title: String,
    content: String,
    status: BlogStatus,
    /// jpeg or png, at most 1 MiB.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

fn blog_form(form: &mut UploadForm) -> BlogForm {
    BlogForm {
        title: form.take("title"),
        content: form.take("content"),
        status: form.take("status"),
    }
}

fn blog_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::from(BlogError::NotFound))
}

#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body(content = BlogUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Blog created", body = Blog),
        (status = 400, description = "Invalid fields or image"),
        (status = 401, description = "Caller is not a verified admin")
    ),
    security(("bearer" = [])),
    tag = "blogs"
)]
pub async fn create_blog(
    blogs: Extension<Arc<BlogService>>,
    multipart: Multipart,
) -> Result<ApiResponse<Blog>, ApiError> {
    let mut form = read_form(multipart).await?;
    let blog = blogs.create(blog_form(&mut form), form.image.take()).await?;
    Ok(ApiResponse::created("Blog created successfully.").data(blog))
}

#[utoipa::path(
    get,
    path = "/api/blogs",
    responses((status = 200, description = "All blogs", body = [Blog])),
    tag = "blogs"
)]
pub async fn list_blogs(
    blogs: Extension<Arc<BlogService>>,
) -> Result<ApiResponse<Vec<Blog>>, ApiError> {
    let all = blogs.list().await?;
    Ok(ApiResponse::ok("All blogs.").data(all))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "The blog", body = Blog),
        (status = 404, description = "Blog not found")
    ),
    tag = "blogs"
)]
pub async fn get_blog(
    blogs: Extension<Arc<BlogService>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Blog>, ApiError> {
    let blog = blogs.get(blog_id(&id)?).await?;
    Ok(ApiResponse::ok("Single blog.").data(blog))
}

#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    request_body(content = BlogUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Blog updated", body = Blog),
        (status = 400, description = "Invalid fields or image"),
        (status = 401, description = "Caller is not a verified admin"),
        (status = 404, description = "Blog not found")
    ),
    security(("bearer" = [])),
    tag = "blogs"
)]
pub async fn update_blog(
    blogs: Extension<Arc<BlogService>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<ApiResponse<Blog>, ApiError> {
    let id = blog_id(&id)?;
    let mut form = read_form(multipart).await?;
    let blog = blogs
        .update(id, blog_form(&mut form), form.image.take())
        .await?;
    Ok(ApiResponse::ok("Blog updated successfully.").data(blog))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog deleted"),
        (status = 401, description = "Caller is not a verified admin"),
        (status = 404, description = "Blog not found")
    ),
    security(("bearer" = [])),
    tag = "blogs"
)]
pub async fn delete_blog(
    blogs: Extension<Arc<BlogService>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    blogs.delete(blog_id(&id)?).await?;
    Ok(ApiResponse::ok("Blog deleted successfully."))
}

#[utoipa::path(
    post,
    path = "/api/blogs/send/{id}",
    params(("id" = String, Path, description = "Blog id")),
    request_body = SendBlogRequest,
    responses(
        (status = 200, description = "Blog mailed to the address"),
        (status = 400, description = "Invalid email"),
        (status = 401, description = "Caller is not a verified admin"),
        (status = 404, description = "Blog not found"),
        (status = 500, description = "Email could not be sent")
    ),
    security(("bearer" = [])),
    tag = "blogs"
)]
pub async fn send_blog(
    blogs: Extension<Arc<BlogService>>,
    Path(id): Path<String>,
    payload: Payload<SendBlogRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = blog_id(&id)?;
    let request = require_payload(payload)?;
    blogs.send(id, request).await?;
    Ok(ApiResponse::ok("Email sent successfully."))
}

#[utoipa::path(
    post,
    path = "/api/blogs/send-all/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog mailed to every verified account", body = DeliveryReport),
        (status = 401, description = "Caller is not a verified admin"),
        (status = 404, description = "Blog not found")
    ),
    security(("bearer" = [])),
    tag = "blogs"
)]
pub async fn send_blog_to_all(
    blogs: Extension<Arc<BlogService>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeliveryReport>, ApiError> {
    let report = blogs.send_all(blog_id(&id)?).await?;
    Ok(ApiResponse::ok("Email sent successfully.").data(report))
}
