//! Field-level validation for catalog writes.
//!
//! Each check returns a [`FieldError`] rather than failing the whole request
//! so callers can collect every failure in one pass. The year upper bound is
//! read from the clock on every call; it must stay correct across year
//! boundaries in long-lived processes.

use chrono::{Datelike, Utc};

use crate::domain::error::FieldError;

/// Earliest accepted publication year.
pub const YEAR_MIN: i32 = 1500;
/// Maximum stored length for titles and attribute names.
pub const TEXT_MAX: usize = 255;

/// The current calendar year (UTC).
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Validate a book title, returning the trimmed value.
pub fn validate_title(title: &str) -> Result<String, FieldError> {
    validate_text("title", title)
}

/// Validate a tag or author name, returning the trimmed value.
pub fn validate_attribute_name(name: &str) -> Result<String, FieldError> {
    validate_text("name", name)
}

fn validate_text(field: &str, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(
            field,
            "blank",
            format!("{field} must not be blank"),
        ));
    }
    if trimmed.chars().count() > TEXT_MAX {
        return Err(FieldError::new(
            field,
            "too_long",
            format!("{field} must be at most {TEXT_MAX} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Validate the page count.
pub fn validate_pages(pages: i32) -> Result<(), FieldError> {
    if pages < 0 {
        return Err(FieldError::new(
            "pages",
            "out_of_range",
            "pages must not be negative",
        ));
    }
    Ok(())
}

/// Validate the publication year against `[YEAR_MIN, current_year]`.
///
/// The caller passes the current year explicitly so tests can pin it and the
/// bound is never cached at startup.
pub fn validate_year(year: i32, current_year: i32) -> Result<(), FieldError> {
    if year < YEAR_MIN || year > current_year {
        return Err(FieldError::new(
            "year",
            "out_of_range",
            format!("year must be between {YEAR_MIN} and {current_year}"),
        ));
    }
    Ok(())
}

/// Validate an optional link, returning the trimmed value.
///
/// Blank links collapse to `None`; the field is optional everywhere.
pub fn validate_link(link: Option<&str>) -> Result<Option<String>, FieldError> {
    let Some(link) = link else {
        return Ok(None);
    };
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > TEXT_MAX {
        return Err(FieldError::new(
            "link",
            "too_long",
            format!("link must be at most {TEXT_MAX} characters"),
        ));
    }
    Ok(Some(trimmed.to_owned()))
}
