use utoipa::{
    Modify, OpenApi,
    openapi::{
        Contact, License,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};

use super::handlers::{blogs, catalog, health, users};
use crate::auth::{
    AuthenticatedUser, EmailRequest, LoginRequest, PublicUser, ResetPasswordRequest,
    SignupRequest, UpdatePasswordRequest, UpdateProfileRequest, UserProfile,
};
use crate::blog::{Blog, BlogStatus, DeliveryReport, SendBlogRequest};
use crate::catalog::{CatalogStatus, Category, Meal};

/// Every documented route. Add new handlers to `paths` so they show up in the document.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::signup,
        users::login,
        users::verify_email,
        users::resend_verification,
        users::forgot_password,
        users::check_reset_link,
        users::reset_password,
        users::update_password,
        users::me,
        users::update_profile,
        users::delete_account,
        catalog::create_category,
        catalog::list_categories,
        catalog::meals_by_category,
        catalog::create_meal,
        catalog::list_meals,
        catalog::get_meal,
        catalog::update_meal,
        catalog::delete_meal,
        blogs::create_blog,
        blogs::list_blogs,
        blogs::get_blog,
        blogs::update_blog,
        blogs::delete_blog,
        blogs::send_blog,
        blogs::send_blog_to_all,
    ),
    components(schemas(
        health::Health,
        AuthenticatedUser,
        PublicUser,
        UserProfile,
        SignupRequest,
        LoginRequest,
        EmailRequest,
        ResetPasswordRequest,
        UpdatePasswordRequest,
        UpdateProfileRequest,
        Category,
        Meal,
        CatalogStatus,
        catalog::CategoryUpload,
        catalog::MealUpload,
        Blog,
        BlogStatus,
        SendBlogRequest,
        DeliveryReport,
        blogs::BlogUpload,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness and build info"),
        (name = "users", description = "Accounts, email verification and password recovery"),
        (name = "catalog", description = "Menu categories and meals"),
        (name = "blogs", description = "Blog posts and newsletter mailing")
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    // Use Cargo.toml metadata instead of the derive defaults.
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = optional_str(env!("CARGO_PKG_DESCRIPTION")).map(str::to_string);
    doc.info.contact = cargo_contact();
    doc.info.license = cargo_license();
    doc
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, email)) => (non_empty(name), non_empty(email.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}
