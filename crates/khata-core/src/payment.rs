//! # Payments & Settlement
//!
//! Payments recorded against a bill or invoice, and the balance they leave.
//!
//! ## Payment Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  netTotal 1000                                                         │
//! │                                                                         │
//! │  paid 0      ──► Unpaid          balance 1000                          │
//! │  paid 400    ──► PartiallyPaid   balance  600                          │
//! │  paid 1000   ──► Paid            balance    0                          │
//! │  paid 1200   ──► Overpaid        balance -200                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;

// =============================================================================
// Payment Status
// =============================================================================

/// Settlement state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
    /// More was paid than the document total; the balance is negative.
    Overpaid,
}

impl PaymentStatus {
    /// Status for a document total and the amount paid against it.
    pub fn from_amounts(net_total: Money, amount_paid: Money) -> Self {
        let balance = net_total - amount_paid;
        if balance.is_negative() {
            PaymentStatus::Overpaid
        } else if balance.is_zero() {
            PaymentStatus::Paid
        } else if !amount_paid.is_positive() {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::PartiallyPaid
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::PartiallyPaid => "Partially Paid",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Overpaid => "Overpaid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment made or received against a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: Money,
    #[ts(as = "String")]
    pub paid_on: NaiveDate,
    #[serde(default)]
    pub method: PaymentMethod,
    /// Cheque number, UTR, card auth code.
    #[serde(default)]
    pub reference: Option<String>,
}

impl Payment {
    pub fn new(amount: Money, paid_on: NaiveDate, method: PaymentMethod) -> Self {
        Payment {
            amount,
            paid_on,
            method,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// Amount paid, balance due and status for one document total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub net_total: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
    pub status: PaymentStatus,
}

impl Settlement {
    /// Settles `net_total` against a list of payments.
    pub fn new(net_total: Money, payments: &[Payment]) -> Self {
        Self::with_paid(net_total, payments.iter().map(|p| p.amount).sum())
    }

    /// Settles `net_total` against an already-summed amount.
    pub fn with_paid(net_total: Money, amount_paid: Money) -> Self {
        Settlement {
            net_total,
            amount_paid,
            balance_due: net_total - amount_paid,
            status: PaymentStatus::from_amounts(net_total, amount_paid),
        }
    }

    /// Records one more payment.
    ///
    /// ## Errors
    /// `InvalidPaymentAmount` when the amount is zero or negative.
    /// Overpayment is allowed (advances, rounding) and only logged.
    pub fn record(&mut self, payment: &Payment) -> CoreResult<()> {
        if !payment.amount.is_positive() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: format!("{} is not a positive amount", payment.amount),
            });
        }

        *self = Self::with_paid(self.net_total, self.amount_paid + payment.amount);
        debug!(
            amount = payment.amount.cents(),
            balance_due = self.balance_due.cents(),
            status = %self.status,
            "Payment recorded"
        );
        if self.status == PaymentStatus::Overpaid {
            warn!(
                overpaid_by = (-self.balance_due).cents(),
                "Payment exceeds balance due"
            );
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
