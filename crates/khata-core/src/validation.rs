//! # Validation Module
//!
//! Submit-time checks for documents, line items and salary formulas.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser form                                                 │
//! │  └── Recalculates on every edit, never validates (bad input is 0)      │
//! │           │                                                             │
//! │           ▼ submit                                                      │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required header fields, lengths, currency code                    │
//! │  └── Line count, quantities, rates, tax rates, payments               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend (system of record)                                   │
//! │  └── Numbering, party existence, stock, accounting                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khata_core::validation::{validate_currency_code, validate_document_number};
//!
//! validate_document_number("INV-2024-0042").unwrap();
//! validate_currency_code("INR").unwrap();
//! assert!(validate_currency_code("RUPEE").is_err());
//! ```

use crate::document::Document;
use crate::error::ValidationError;
use crate::formula::Formula;
use crate::line_item::LineItem;
use crate::money::Money;
use crate::types::{TaxRate, MAX_TAX_RATE_BPS};
use crate::{MAX_DOCUMENT_NUMBER_LEN, MAX_LINE_ITEMS, MAX_PARTY_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a document number.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
pub fn validate_document_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "document number".to_string(),
        });
    }

    if number.chars().count() > MAX_DOCUMENT_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: "document number".to_string(),
            max: MAX_DOCUMENT_NUMBER_LEN,
        });
    }

    Ok(())
}

/// Validates a customer or supplier name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_party_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "party name".to_string(),
        });
    }

    if name.chars().count() > MAX_PARTY_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "party name".to_string(),
            max: MAX_PARTY_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an ISO 4217 style code: exactly three ASCII letters.
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter currency code".to_string(),
        });
    }

    Ok(())
}

/// Validates that formula text parses.
pub fn validate_formula(source: &str) -> ValidationResult<()> {
    Formula::parse(source)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidFormat {
            field: "formula".to_string(),
            reason: e.to_string(),
        })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a tax rate (0% to 100%).
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.bps() > MAX_TAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: i64::from(MAX_TAX_RATE_BPS),
        });
    }

    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates one line item.
///
/// ## Rules
/// - Quantity, net quantity, rate and discount must not be negative
/// - Tax rate at most 100%
///
/// A zero quantity or rate is allowed; such a line totals zero.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    if item.quantity.is_negative() || item.net_quantity.is_some_and(|q| q.is_negative()) {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    if item.rate.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "rate".to_string(),
        });
    }

    if item.discount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        });
    }

    if let Some(rate) = item.tax_rate {
        validate_tax_rate(rate)?;
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of line items.
///
/// ## Rules
/// - At least one line
/// - At most MAX_LINE_ITEMS (500)
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "line items".to_string(),
        });
    }

    if count > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "line items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates a whole document before submission.
///
/// Returns the first failure. Line errors name the 1-based row.
pub fn validate_document(document: &Document) -> ValidationResult<()> {
    validate_document_number(&document.number)?;
    validate_party_name(&document.party_name)?;
    validate_currency_code(&document.currency)?;
    validate_line_count(document.lines.len())?;

    for (i, item) in document.lines.iter().enumerate() {
        validate_line_item(item).map_err(|e| match e {
            ValidationError::MustNotBeNegative { field } => ValidationError::MustNotBeNegative {
                field: format!("line {} {}", i + 1, field),
            },
            ValidationError::OutOfRange { field, min, max } => ValidationError::OutOfRange {
                field: format!("line {} {}", i + 1, field),
                min,
                max,
            },
            other => other,
        })?;
    }

    for field in [
        ("header discount", document.header.header_discount),
        ("other charges", document.header.other_charges),
        ("amount paid", document.header.amount_paid),
    ] {
        if field.1.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: field.0.to_string(),
            });
        }
    }

    for payment in &document.payments {
        validate_payment_amount(payment.amount)?;
    }

    if let Some(due) = document.due_date {
        if due < document.date {
            return Err(ValidationError::InvalidFormat {
                field: "due date".to_string(),
                reason: "must not be before the document date".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use khata_core::validation::validate_uuid;
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
