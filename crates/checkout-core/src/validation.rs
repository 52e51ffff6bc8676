//! # Validation Module
//!
//! Input validation utilities for checkout operations.
//!
//! These run before any business logic: quantity bounds before pricing,
//! code format before the offer store is queried, id format before cart
//! lookups. Store-level constraints (unique codes, referential integrity)
//! are a second layer behind the port traits.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Example
/// ```rust
/// use checkout_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(1000).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> CoreResult<()> {
    if qty < 1 || qty > MAX_ITEM_QUANTITY {
        return Err(CoreError::InvalidQuantity { requested: qty });
    }

    Ok(())
}

/// Validates a rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_percent_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates and normalizes an offer code.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 32 characters
/// - Alphanumeric, hyphens, and underscores only
///
/// ## Returns
/// The trimmed, uppercased code. Codes are stored and matched uppercase.
///
/// ## Example
/// ```rust
/// use checkout_core::validation::validate_offer_code;
///
/// assert_eq!(validate_offer_code(" save10 ").unwrap(), "SAVE10");
/// assert!(validate_offer_code("").is_err());
/// assert!(validate_offer_code("has space").is_err());
/// ```
pub fn validate_offer_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 32,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_uppercase())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use checkout_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
