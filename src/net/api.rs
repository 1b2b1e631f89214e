//! Feature-level API calls, one per dashboard or public-page action.
//!
//! Each function builds a request descriptor and hands it to the typed
//! client. Errors are returned unchanged so callers can show the server's
//! message as-is.

use reqwest::multipart::Form;
use serde::de::IgnoredAny;

use super::client::ApiClient;
use super::request::{ApiRequest, FileUpload};
use super::types::{
    BlogPost, Booking, BookingStatus, GalleryItem, LoginRequest, LoginResponse, NewBooking, NewTestimonial,
    PhotoKind, Service, StatusUpdate, Testimonial,
};
use crate::error::ApiError;

/// Multipart fields for creating or updating a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUpload {
    pub name: String,
    pub description: String,
    pub details: Vec<String>,
    pub image: Option<FileUpload>,
}

/// Multipart fields for a new before/after gallery item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryUpload {
    pub service_type: String,
    pub description: String,
    pub before: Vec<FileUpload>,
    pub after: Vec<FileUpload>,
}

/// Multipart fields for a new blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogUpload {
    pub title: String,
    pub content: String,
    pub image: FileUpload,
}

async fn remove(client: &ApiClient, endpoint: String) -> Result<(), ApiError> {
    client.request::<IgnoredAny>(ApiRequest::remove(endpoint)).await?;
    Ok(())
}

// =============================================================================
// AUTH
// =============================================================================

/// Exchange operator credentials for a profile and bearer token.
///
/// # Errors
///
/// Returns the API failure unchanged (e.g. 401 `Invalid credentials`).
pub async fn login_user(client: &ApiClient, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
    let req = ApiRequest::create("users/login").json(&LoginRequest { email, password })?;
    client.request(req).await
}

// =============================================================================
// BOOKINGS
// =============================================================================

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn get_bookings(client: &ApiClient) -> Result<Vec<Booking>, ApiError> {
    client.request(ApiRequest::retrieve("bookings")).await
}

/// Submit a public quote request.
///
/// # Errors
///
/// Returns the API failure unchanged.
pub async fn create_booking(client: &ApiClient, booking: &NewBooking) -> Result<Booking, ApiError> {
    client.request(ApiRequest::create("bookings").json(booking)?).await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn update_booking_status(client: &ApiClient, id: &str, status: BookingStatus) -> Result<Booking, ApiError> {
    let req = ApiRequest::replace(format!("bookings/{id}/status")).json(&StatusUpdate { status })?;
    client.request(req).await
}

/// Attach before or after photos to a booking.
///
/// # Errors
///
/// Returns the API failure unchanged.
pub async fn upload_booking_photos(
    client: &ApiClient,
    id: &str,
    kind: PhotoKind,
    photos: Vec<FileUpload>,
) -> Result<Booking, ApiError> {
    let mut form = Form::new().text("type", kind.as_str());
    for photo in photos {
        form = form.part("photos", photo.into_part()?);
    }
    client
        .request(ApiRequest::create(format!("bookings/{id}/photos")).multipart(form))
        .await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn delete_booking(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    remove(client, format!("bookings/{id}")).await
}

// =============================================================================
// SERVICES
// =============================================================================

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn get_services(client: &ApiClient) -> Result<Vec<Service>, ApiError> {
    client.request(ApiRequest::retrieve("services")).await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn get_service(client: &ApiClient, id: &str) -> Result<Service, ApiError> {
    client.request(ApiRequest::retrieve(format!("services/{id}"))).await
}

fn service_form(upload: ServiceUpload) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("name", upload.name)
        .text("description", upload.description)
        .text("details", upload.details.join(", "));
    if let Some(image) = upload.image {
        form = form.part("image", image.into_part()?);
    }
    Ok(form)
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn create_service(client: &ApiClient, upload: ServiceUpload) -> Result<Service, ApiError> {
    let req = ApiRequest::create("services").multipart(service_form(upload)?);
    client.request(req).await
}

/// Replace a service; omitting the image keeps the current one.
///
/// # Errors
///
/// Returns the API failure unchanged.
pub async fn update_service(client: &ApiClient, id: &str, upload: ServiceUpload) -> Result<Service, ApiError> {
    let req = ApiRequest::replace(format!("services/{id}")).multipart(service_form(upload)?);
    client.request(req).await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn delete_service(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    remove(client, format!("services/{id}")).await
}

// =============================================================================
// GALLERY
// =============================================================================

/// Public gallery feed.
///
/// # Errors
///
/// Returns the API failure unchanged.
pub async fn get_public_gallery(client: &ApiClient) -> Result<Vec<GalleryItem>, ApiError> {
    client.request(ApiRequest::retrieve("gallery")).await
}

/// Gallery items as listed on the management screen.
///
/// # Errors
///
/// Returns the API failure unchanged.
pub async fn get_gallery_items(client: &ApiClient) -> Result<Vec<GalleryItem>, ApiError> {
    client.request(ApiRequest::retrieve("gallery/manage")).await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn create_gallery_item(client: &ApiClient, upload: GalleryUpload) -> Result<GalleryItem, ApiError> {
    let mut form = Form::new()
        .text("serviceType", upload.service_type)
        .text("description", upload.description);
    for photo in upload.before {
        form = form.part("beforePhotos", photo.into_part()?);
    }
    for photo in upload.after {
        form = form.part("afterPhotos", photo.into_part()?);
    }
    client
        .request(ApiRequest::create("gallery/manage").multipart(form))
        .await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn delete_gallery_item(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    remove(client, format!("gallery/manage/{id}")).await
}

// =============================================================================
// BLOG
// =============================================================================

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn get_blog_posts(client: &ApiClient) -> Result<Vec<BlogPost>, ApiError> {
    client.request(ApiRequest::retrieve("blog")).await
}

/// Find one post; the API has no single-post route so the list is searched.
///
/// # Errors
///
/// Returns the list failure unchanged, or a 404 `Status` if no post matches.
pub async fn get_blog_post(client: &ApiClient, id: &str) -> Result<BlogPost, ApiError> {
    get_blog_posts(client)
        .await?
        .into_iter()
        .find(|post| post.id == id)
        .ok_or_else(|| ApiError::Status { message: "Blog post not found".to_owned(), status: 404 })
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn create_blog_post(client: &ApiClient, upload: BlogUpload) -> Result<BlogPost, ApiError> {
    let form = Form::new()
        .text("title", upload.title)
        .text("content", upload.content)
        .part("image", upload.image.into_part()?);
    client.request(ApiRequest::create("blog").multipart(form)).await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn delete_blog_post(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    remove(client, format!("blog/{id}")).await
}

// =============================================================================
// TESTIMONIALS
// =============================================================================

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn get_testimonials(client: &ApiClient) -> Result<Vec<Testimonial>, ApiError> {
    client.request(ApiRequest::retrieve("testimonials")).await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn create_testimonial(client: &ApiClient, testimonial: &NewTestimonial) -> Result<Testimonial, ApiError> {
    client
        .request(ApiRequest::create("testimonials").json(testimonial)?)
        .await
}

/// # Errors
///
/// Returns the API failure unchanged.
pub async fn delete_testimonial(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    remove(client, format!("testimonials/{id}")).await
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
