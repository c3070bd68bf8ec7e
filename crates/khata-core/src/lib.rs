//! # khata-core: Pure Business Logic for Khata ERP
//!
//! Every form in the ERP (sales invoices, purchase bills, debit notes,
//! purchase orders, payroll) shares the logic in this crate. It performs
//! no I/O: the browser and the CLI feed it values and render what it
//! returns.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Khata ERP Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Browser forms / khata CLI                          │   │
//! │  │    Invoice ──► Bill ──► Debit Note ──► PO ──► Salary Structure  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ khata-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ line_item │  │  totals   │  │ currency  │  │  formula  │  │   │
//! │  │   │  coerce   │  │  payment  │  │   words   │  │  payroll  │  │   │
//! │  │   │ document  │  │   money   │  │  summary  │  │validation │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO AMBIENT STATE • PURE FUNCTIONS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              khata-client (REST layer)                          │   │
//! │  │        RequestContext, ApiClient, document & payroll services   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in minor units, rounding helpers
//! - [`types`] - TaxRate, Quantity, DocumentKind, PaymentMethod
//! - [`coerce`] - Lenient form-number coercion
//! - [`line_item`] - Typed line items and their form payload
//! - [`totals`] - The document totals calculator
//! - [`payment`] - Payments, settlement and payment status
//! - [`document`] - Documents and the form payload they come from
//! - [`currency`] / [`words`] - Presentation formatting
//! - [`summary`] - Printable display strings
//! - [`formula`] / [`payroll`] - Salary formulas and payslips
//! - [`validation`] - Submit-time checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use khata_core::{calculate_totals, format_currency, HeaderInputs, LineItem, Money};
//! use khata_core::{Quantity, TaxRate};
//!
//! let lines = [
//!     LineItem::new(Quantity::from_units(2), Money::from_major(50))
//!         .with_discount(Money::from_major(10)),
//!     LineItem::new(Quantity::from_units(1), Money::from_major(200))
//!         .with_tax_rate(TaxRate::from_bps(500)),
//! ];
//! let totals = calculate_totals(&lines, &HeaderInputs::default());
//!
//! assert_eq!(format_currency(totals.net_total, "INR"), "₹300.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coerce;
pub mod currency;
pub mod document;
pub mod error;
pub mod formula;
pub mod line_item;
pub mod money;
pub mod payment;
pub mod payroll;
pub mod summary;
pub mod totals;
pub mod types;
pub mod validation;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use currency::{format_amount, format_currency};
pub use document::{Document, DocumentInput};
pub use error::{CoreError, CoreResult, FormulaError, ValidationError};
pub use formula::{Formula, Variables};
pub use line_item::{LineItem, LineItemInput};
pub use money::Money;
pub use payment::{Payment, PaymentStatus, Settlement};
pub use payroll::{Payslip, SalaryStructure};
pub use summary::DocumentSummary;
pub use totals::{calculate_totals, DocumentTotals, HeaderInputs, TotalsCalculator};
pub use types::*;
pub use words::{amount_in_words, number_to_words};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency assumed when a document names none.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Maximum line items on one document.
pub const MAX_LINE_ITEMS: usize = 500;

/// Maximum length of a document number.
pub const MAX_DOCUMENT_NUMBER_LEN: usize = 50;

/// Maximum length of a customer or supplier name.
pub const MAX_PARTY_NAME_LEN: usize = 200;
