//! Input validation helpers
//!
//! Centralized limits and validation functions for CRUD handlers and the
//! lifecycle engine. Limits are chosen based on reasonable UX limits for
//! names, notes and reasons; the document store has no built-in length
//! enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: agent name, customer name, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, unassignment reasons, timeline notes
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, external order id, etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Upper bound on a single bulk operation. Document-store batches cap at a
/// few hundred writes, so oversized inputs are rejected up front instead of
/// failing mid-commit.
pub const MAX_BULK_ORDERS: usize = 500;

/// Maximum accepted delivery distance in km
pub const MAX_DISTANCE_KM: f64 = 10_000.0;

/// Maximum accepted delivery fee
pub const MAX_FEE: f64 = 1_000_000.0;

// ── Validation helpers ──────────────────────────────────────────────

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

/// Validate a delivery distance: finite, non-negative, bounded.
pub fn validate_distance(value: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "distance must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "distance must be non-negative, got {value}"
        )));
    }
    if value > MAX_DISTANCE_KM {
        return Err(AppError::validation(format!(
            "distance exceeds maximum allowed ({MAX_DISTANCE_KM}), got {value}"
        )));
    }
    Ok(())
}

/// Validate a delivery fee: finite, non-negative, bounded.
pub fn validate_fee(value: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "fee must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "fee must be non-negative, got {value}"
        )));
    }
    if value > MAX_FEE {
        return Err(AppError::validation(format!(
            "fee exceeds maximum allowed ({MAX_FEE}), got {value}"
        )));
    }
    Ok(())
}

/// Validate a commission percentage (integer 0–100).
pub fn validate_percentage(value: u32) -> Result<(), AppError> {
    if value > 100 {
        return Err(AppError::validation(format!(
            "commission percentage must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}
