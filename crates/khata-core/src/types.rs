//! # Domain Types
//!
//! Small value types shared by every document form.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │    Quantity     │   │  DocumentKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  thousandths    │   │  SalesInvoice   │       │
//! │  │  500 = 5%       │   │  12345 = 12.345 │   │  PurchaseBill   │       │
//! │  └─────────────────┘   └─────────────────┘   │  DebitNote      │       │
//! │                                              │  PurchaseOrder  │       │
//! │  ┌─────────────────┐                         └─────────────────┘       │
//! │  │ PaymentMethod   │                                                   │
//! │  │  Cash, Bank,    │                                                   │
//! │  │  Cheque, Card,  │                                                   │
//! │  │  Upi            │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::parse_fixed;

// =============================================================================
// Tax Rate
// =============================================================================

/// Basis points in 100%.
pub const MAX_TAX_RATE_BPS: u32 = 10_000;

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. GST slabs (5%, 12%, 18%, 28%) and fractional
/// cess rates are all exact integers in bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage.
    ///
    /// Negative and NaN percentages become zero.
    pub fn from_percentage(pct: f64) -> Self {
        // float-to-int `as` saturates and maps NaN to 0
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Renders as a trimmed percentage: `5%`, `8.25%`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{}%", whole),
            n if n % 10 == 0 => write!(f, "{}.{}%", whole, n / 10),
            n => write!(f, "{}.{:02}%", whole, n),
        }
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Thousandths per unit.
const QUANTITY_SCALE: i64 = 1000;

/// A line quantity with three decimals of precision.
///
/// Weighed goods are billed by gross or net weight (`12.345` kg), so a
/// plain integer count is not enough. Stored as thousandths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * QUANTITY_SCALE)
    }

    /// Creates a quantity from thousandths of a unit.
    #[inline]
    pub const fn from_thousandths(thousandths: i64) -> Self {
        Quantity(thousandths)
    }

    /// Parses decimal text such as `"12.345"`.
    pub fn parse(text: &str) -> Option<Self> {
        parse_fixed(text, 3).map(Quantity)
    }

    /// Returns the quantity in thousandths.
    #[inline]
    pub const fn thousandths(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Checks if the quantity is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the quantity is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

/// Renders without trailing zeros: `10`, `12.5`, `12.345`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / QUANTITY_SCALE as u64;
        let frac = abs % QUANTITY_SCALE as u64;
        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let digits = format!("{:03}", frac);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

// =============================================================================
// Document Kind
// =============================================================================

/// The kinds of document whose totals the calculator derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Invoice raised on a customer.
    SalesInvoice,
    /// Supplier bill (purchase invoice).
    PurchaseBill,
    /// Debit note raised against a supplier bill.
    DebitNote,
    /// Purchase order sent to a supplier.
    PurchaseOrder,
}

impl DocumentKind {
    /// Every kind, in menu order.
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::SalesInvoice,
        DocumentKind::PurchaseBill,
        DocumentKind::DebitNote,
        DocumentKind::PurchaseOrder,
    ];

    /// REST collection path for this kind.
    pub const fn endpoint(&self) -> &'static str {
        match self {
            DocumentKind::SalesInvoice => "sales/invoices",
            DocumentKind::PurchaseBill => "purchase/bills",
            DocumentKind::DebitNote => "purchase/debit-notes",
            DocumentKind::PurchaseOrder => "purchase/orders",
        }
    }

    /// Heading printed on the document.
    pub const fn title(&self) -> &'static str {
        match self {
            DocumentKind::SalesInvoice => "Tax Invoice",
            DocumentKind::PurchaseBill => "Purchase Bill",
            DocumentKind::DebitNote => "Debit Note",
            DocumentKind::PurchaseOrder => "Purchase Order",
        }
    }

    /// The config-file key for this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::SalesInvoice => "sales_invoice",
            DocumentKind::PurchaseBill => "purchase_bill",
            DocumentKind::DebitNote => "debit_note",
            DocumentKind::PurchaseOrder => "purchase_order",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sales_invoice" | "invoice" => Ok(DocumentKind::SalesInvoice),
            "purchase_bill" | "bill" | "purchase_invoice" => Ok(DocumentKind::PurchaseBill),
            "debit_note" => Ok(DocumentKind::DebitNote),
            "purchase_order" | "po" => Ok(DocumentKind::PurchaseOrder),
            _ => Err(ValidationError::NotAllowed {
                field: "document kind".to_string(),
                allowed: DocumentKind::ALL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    BankTransfer,
    Cheque,
    Card,
    Upi,
}

impl PaymentMethod {
    /// Reads the labels payment forms use (`"Bank Transfer"`, `"NEFT"`, `"cheque"`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "bank_transfer" | "bank" | "neft" | "rtgs" | "imps" => Some(PaymentMethod::BankTransfer),
            "cheque" | "check" => Some(PaymentMethod::Cheque),
            "card" | "credit_card" | "debit_card" => Some(PaymentMethod::Card),
            "upi" => Some(PaymentMethod::Upi),
            _ => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
