//! Caller-side form validation.
//!
//! These checks run before any API call is attempted and turn raw form input
//! into the payloads expected by [`crate::net::api`]. Every failing field is
//! reported at once so a form can highlight all of them.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ValidationErrors;
use crate::net::api::{BlogUpload, GalleryUpload, ServiceUpload};
use crate::net::request::FileUpload;
use crate::net::types::{NewBooking, NewTestimonial};

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Keep only ASCII digits, as the phone input does while typing.
#[must_use]
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

// =============================================================================
// QUOTE REQUEST
// =============================================================================

/// Public booking ("get a quote") form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteRequestForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub unit_house_number: String,
    pub street_name: String,
    pub state: String,
    pub services: Vec<String>,
    pub notes: String,
}

impl QuoteRequestForm {
    /// Validate and stamp the request with the current time.
    ///
    /// # Errors
    ///
    /// Returns every field that failed validation.
    pub fn validate(self) -> Result<NewBooking, ValidationErrors> {
        self.validate_at(OffsetDateTime::now_utc())
    }

    /// Validate with an explicit submission time.
    ///
    /// # Errors
    ///
    /// Returns every field that failed validation.
    pub fn validate_at(self, submitted_at: OffsetDateTime) -> Result<NewBooking, ValidationErrors> {
        let phone = digits_only(&self.phone);
        let services: Vec<String> = self
            .services
            .iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        let mut errors = ValidationErrors::default();
        if blank(&self.name) {
            errors.push("name", "is required");
        }
        if phone.is_empty() {
            errors.push("phone", "is required");
        }
        if blank(&self.email) || !self.email.contains('@') {
            errors.push("email", "must be a valid email address");
        }
        if blank(&self.unit_house_number) {
            errors.push("unitHouseNumber", "is required");
        }
        if blank(&self.street_name) {
            errors.push("streetName", "is required");
        }
        if blank(&self.state) {
            errors.push("state", "is required");
        }
        if services.is_empty() {
            errors.push("services", "select at least one service");
        }
        let preferred_date_time = submitted_at.format(&Rfc3339).unwrap_or_else(|_| {
            errors.push("preferredDateTime", "could not be formatted");
            String::new()
        });
        errors.into_result()?;

        Ok(NewBooking {
            name: self.name.trim().to_owned(),
            phone,
            email: self.email.trim().to_owned(),
            address: format!(
                "{} {}, {}",
                self.unit_house_number.trim(),
                self.street_name.trim(),
                self.state.trim()
            ),
            service_type: services.join(", "),
            preferred_date_time,
            notes: self.notes,
        })
    }
}

// =============================================================================
// ADMIN FORMS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryForm {
    pub service_type: String,
    pub description: String,
    pub before: Vec<FileUpload>,
    pub after: Vec<FileUpload>,
}

impl GalleryForm {
    /// # Errors
    ///
    /// Both text fields and at least one photo on each side are required.
    pub fn validate(self) -> Result<GalleryUpload, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.service_type) {
            errors.push("serviceType", "is required");
        }
        if blank(&self.description) {
            errors.push("description", "is required");
        }
        if self.before.is_empty() {
            errors.push("beforePhotos", "select at least one photo");
        }
        if self.after.is_empty() {
            errors.push("afterPhotos", "select at least one photo");
        }
        errors.into_result()?;
        Ok(GalleryUpload {
            service_type: self.service_type,
            description: self.description,
            before: self.before,
            after: self.after,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogForm {
    pub title: String,
    pub content: String,
    pub image: Option<FileUpload>,
}

impl BlogForm {
    /// # Errors
    ///
    /// Title, content and an image are all required.
    pub fn validate(self) -> Result<BlogUpload, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.title) {
            errors.push("title", "is required");
        }
        if blank(&self.content) {
            errors.push("content", "is required");
        }
        let Some(image) = self.image else {
            errors.push("image", "select an image");
            return Err(errors);
        };
        errors.into_result()?;
        Ok(BlogUpload { title: self.title, content: self.content, image })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceForm {
    pub name: String,
    pub description: String,
    /// Comma-separated list, e.g. `Mowing, Edging, Blowing`.
    pub details: String,
    pub image: Option<FileUpload>,
}

impl ServiceForm {
    /// # Errors
    ///
    /// Name and description are required.
    pub fn validate(self) -> Result<ServiceUpload, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.name) {
            errors.push("name", "is required");
        }
        if blank(&self.description) {
            errors.push("description", "is required");
        }
        errors.into_result()?;
        let details = self
            .details
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(ServiceUpload { name: self.name, description: self.description, details, image: self.image })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialForm {
    pub name: String,
    pub location: String,
    pub rating: u8,
    pub review_text: String,
}

impl Default for TestimonialForm {
    fn default() -> Self {
        Self { name: String::new(), location: String::new(), rating: 5, review_text: String::new() }
    }
}

impl TestimonialForm {
    /// # Errors
    ///
    /// Text fields are required and the rating must be 1 to 5.
    pub fn validate(self) -> Result<NewTestimonial, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.name) {
            errors.push("name", "is required");
        }
        if blank(&self.location) {
            errors.push("location", "is required");
        }
        if !(1..=5).contains(&self.rating) {
            errors.push("rating", "must be between 1 and 5");
        }
        if blank(&self.review_text) {
            errors.push("reviewText", "is required");
        }
        errors.into_result()?;
        Ok(NewTestimonial {
            name: self.name,
            location: self.location,
            rating: self.rating,
            review_text: self.review_text,
        })
    }
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
