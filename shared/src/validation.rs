//! Validation utilities for the Farmlytics platform
//!
//! Includes India-specific identifier checks used by the registration flow.

use rust_decimal::Decimal;

use crate::models::{PRODUCT_CATEGORIES, PRODUCT_UNITS};

/// Longest accepted post, comment or message body
pub const MAX_CONTENT_LENGTH: usize = 5000;

// ============================================================================
// Content Validations
// ============================================================================

/// Validate user-written text (posts, comments, messages)
pub fn validate_content(content: &str) -> Result<(), &'static str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("Content cannot be empty");
    }
    if trimmed.chars().count() > MAX_CONTENT_LENGTH {
        return Err("Content is too long");
    }
    Ok(())
}

/// Validate a display name
pub fn validate_full_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Full name cannot be empty");
    }
    if trimmed.chars().count() > 120 {
        return Err("Full name must be at most 120 characters");
    }
    Ok(())
}

/// Validate an uploaded image reference
pub fn validate_image_url(url: &str) -> Result<(), &'static str> {
    let url = url.trim();
    if url.is_empty() {
        return Err("Image URL is required");
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err("Image URL must be an http(s) URL");
    }
    Ok(())
}

/// Validate a diagnosis confidence percentage
pub fn validate_confidence(confidence: i32) -> Result<(), &'static str> {
    if !(0..=100).contains(&confidence) {
        return Err("Confidence must be between 0 and 100");
    }
    Ok(())
}

// ============================================================================
// Marketplace Validations
// ============================================================================

/// Price must be strictly positive
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be greater than zero");
    }
    Ok(())
}

/// Quantity may be zero (sold out) but never negative
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), &'static str> {
    if PRODUCT_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err("Unknown product category")
    }
}

pub fn validate_unit(unit: &str) -> Result<(), &'static str> {
    if PRODUCT_UNITS.contains(&unit) {
        Ok(())
    } else {
        Err("Unknown unit")
    }
}

// ============================================================================
// India-Specific Validations
// ============================================================================

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

/// Aadhaar number: exactly 12 digits
pub fn validate_aadhaar(aadhaar: &str) -> Result<(), &'static str> {
    if is_digits(aadhaar, 12) {
        Ok(())
    } else {
        Err("Aadhaar must be exactly 12 digits")
    }
}

/// Unique Land Parcel Identification Number: exactly 14 digits
pub fn validate_ulpin(ulpin: &str) -> Result<(), &'static str> {
    if is_digits(ulpin, 14) {
        Ok(())
    } else {
        Err("ULPIN must be exactly 14 digits")
    }
}

/// Validate an Indian mobile number
/// Accepts: 9876543210, 98765-43210, +919876543210, 09876543210
pub fn validate_indian_mobile(mobile: &str) -> Result<(), &'static str> {
    let digits: String = mobile.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('0') => &digits[1..],
        12 if digits.starts_with("91") => &digits[2..],
        _ => return Err("Invalid mobile number format"),
    };

    if local.starts_with(['6', '7', '8', '9']) {
        Ok(())
    } else {
        Err("Invalid mobile number format")
    }
}
