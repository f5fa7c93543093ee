//! Input validation helpers
//!
//! Plain functions called explicitly by handlers and services before any
//! database work. SQLite TEXT has no built-in length enforcement.

use shared::{AppError, ErrorCode};
use validator::ValidateEmail;

// ── Limits ──────────────────────────────────────────────────────────

/// Entity names: user, category, product, variant
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions and checkout notes
pub const MAX_NOTE_LEN: usize = 500;

/// SKUs, slugs, stock locations
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Units of one variant per cart or order line
pub const MIN_QUANTITY: i64 = 1;
pub const MAX_QUANTITY: i64 = 100;

/// Highest accepted unit price
pub const MAX_PRICE: f64 = 1_000_000.0;

// ── Text ────────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.len() > MAX_EMAIL_LEN || !email.validate_email() {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

/// Slugs: lowercase ASCII letters, digits and single dashes
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    validate_required_text(slug, "slug", MAX_SHORT_TEXT_LEN)?;
    let well_formed = slug
        .split('-')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    if !well_formed {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "slug may only contain lowercase letters, digits and dashes",
        ));
    }
    Ok(())
}

// ── Numbers ─────────────────────────────────────────────────────────

/// Quantity in `MIN_QUANTITY..=MAX_QUANTITY`, reported with `code`
pub fn validate_quantity(quantity: i64, code: ErrorCode) -> Result<(), AppError> {
    if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::with_message(
            code,
            format!("Quantity must be between {MIN_QUANTITY} and {MAX_QUANTITY}"),
        )
        .with_detail("quantity", quantity));
    }
    Ok(())
}

/// Price: finite, non-negative, at most 2 decimals
pub fn validate_price(price: f64, field: &str) -> Result<(), AppError> {
    if !price.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number")));
    }
    if price < 0.0 {
        return Err(AppError::validation(format!("{field} must be non-negative")));
    }
    if price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_PRICE})"
        )));
    }
    let cents = price * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        return Err(AppError::validation(format!(
            "{field} must have at most 2 decimal places"
        )));
    }
    Ok(())
}

/// Optional price-range filter bounds
pub fn validate_price_range(min: Option<f64>, max: Option<f64>) -> Result<(), AppError> {
    for (value, field) in [(min, "minPrice"), (max, "maxPrice")] {
        if let Some(v) = value
            && (!v.is_finite() || v < 0.0)
        {
            return Err(AppError::validation(format!(
                "{field} must be a non-negative number"
            )));
        }
    }
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(AppError::validation("minPrice must not exceed maxPrice"));
    }
    Ok(())
}
