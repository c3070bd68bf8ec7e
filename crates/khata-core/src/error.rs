//! # Error Types
//!
//! Domain-specific error types for khata-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  khata-core errors (this file)                                         │
//! │  ├── CoreError        - Payroll and document rule failures             │
//! │  ├── ValidationError  - Submit-time input validation failures          │
//! │  └── FormulaError     - Salary formula parse/evaluation failures       │
//! │                                                                         │
//! │  khata-client errors (separate crate)                                  │
//! │  └── ClientError      - HTTP, decoding and config failures             │
//! │                                                                         │
//! │  Flow: FormulaError → CoreError → ClientError → CLI (anyhow)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals and formatting never fail: malformed numbers coerce to zero
//! before they reach the calculator. Only validation, payroll formulas
//! and date parsing produce errors.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A salary component formula could not be parsed or evaluated.
    ///
    /// ## When This Occurs
    /// - Formula text has a syntax error (`basic * / 2`)
    /// - Formula references a variable that is not defined yet
    /// - Formula divides by zero for this employee's basic
    #[error("Salary component '{component}': {source}")]
    ComponentFormula {
        component: String,
        #[source]
        source: FormulaError,
    },

    /// Two salary components share a code.
    #[error("Duplicate salary component code: {0}")]
    DuplicateComponent(String),

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Formula error outside of a salary structure.
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at submit time only; recalculation never validates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate component code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Formula Error
// =============================================================================

/// Errors from parsing or evaluating a salary formula.
///
/// Positions are byte offsets into the formula text so the form can
/// underline the offending character.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("formula is longer than {max} characters")]
    TooLong { max: usize },

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("unexpected '{found}' at position {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("formula ends unexpectedly")]
    UnexpectedEnd,

    #[error("unclosed parenthesis opened at position {position}")]
    UnclosedParenthesis { position: usize },

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("formula nests deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("formula result is not a finite number")]
    NonFinite,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
