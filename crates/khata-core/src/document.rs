//! # Documents
//!
//! Invoices, bills, debit notes and purchase orders as one shape: a header,
//! line items, header inputs for the totals, and payments.
//!
//! ## Recalculate vs Submit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form JSON ──► DocumentInput ──┬──► totals()          (every edit)     │
//! │                (lenient)       │     never fails                       │
//! │                                │                                        │
//! │                                └──► into_document()   (submit only)    │
//! │                                      dates and id parsed, then         │
//! │                                      validation::validate_document     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;

use crate::coerce::{self, AliasGroup};
use crate::error::ValidationError;
use crate::line_item::{lenient_lines, LineItem, LineItemInput};
use crate::money::Money;
use crate::payment::{Payment, Settlement};
use crate::totals::{DocumentTotals, HeaderInput, HeaderInputs, TotalsCalculator};
use crate::types::{DocumentKind, PaymentMethod};
use crate::DEFAULT_CURRENCY;

// =============================================================================
// Document
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Backend id; `None` until the document is first saved.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub id: Option<Uuid>,
    pub kind: DocumentKind,
    pub number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub party_name: String,
    /// ISO 4217 code.
    pub currency: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub header: HeaderInputs,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Document {
    pub fn new(kind: DocumentKind, number: impl Into<String>, date: NaiveDate) -> Self {
        Document {
            id: None,
            kind,
            number: number.into(),
            date,
            due_date: None,
            party_name: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            notes: None,
            lines: Vec::new(),
            header: HeaderInputs::default(),
            payments: Vec::new(),
        }
    }

    pub fn with_party(mut self, party_name: impl Into<String>) -> Self {
        self.party_name = party_name.into();
        self
    }

    pub fn with_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    /// Amount paid at creation plus every recorded payment.
    pub fn amount_paid(&self) -> Money {
        self.header.amount_paid + self.payments.iter().map(|p| p.amount).sum::<Money>()
    }

    pub fn totals(&self, calculator: &TotalsCalculator) -> DocumentTotals {
        let header = HeaderInputs {
            amount_paid: self.amount_paid(),
            ..self.header
        };
        calculator.compute(&self.lines, &header)
    }

    pub fn settlement(&self, calculator: &TotalsCalculator) -> Settlement {
        Settlement::with_paid(self.totals(calculator).net_total, self.amount_paid())
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

// =============================================================================
// DocumentInput (lenient form payload)
// =============================================================================

/// A payment row as a form posts it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    #[serde(default, deserialize_with = "coerce::money")]
    pub amount: Money,
    #[serde(default, deserialize_with = "coerce::text")]
    pub paid_on: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub method: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub reference: String,
}

impl PaymentInput {
    pub const ALIASES: &'static [AliasGroup] = &[
        &["paidOn", "paymentDate"],
        &["method", "paymentMethod"],
    ];

    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(coerce::resolve_aliases(value, Self::ALIASES)).unwrap_or_default()
    }
}

fn lenient_payments<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<PaymentInput>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(rows) => rows.into_iter().map(PaymentInput::from_value).collect(),
        _ => Vec::new(),
    })
}

/// A whole document as a form posts it.
///
/// Read it through [`DocumentInput::from_value`], which folds the field
/// aliases below before the typed read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    #[serde(default, deserialize_with = "coerce::text")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub number: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub date: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub due_date: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub party_name: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub currency: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub notes: String,

    #[serde(default, deserialize_with = "lenient_lines")]
    pub lines: Vec<LineItemInput>,

    #[serde(default, deserialize_with = "lenient_payments")]
    pub payments: Vec<PaymentInput>,

    #[serde(flatten)]
    pub header: HeaderInput,
}

/// Reads `YYYY-MM-DD`, or the date part of an ISO timestamp.
pub fn parse_date(field: &str, text: &str) -> Result<NaiveDate, ValidationError> {
    let text = text.trim();
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{text}' is not a YYYY-MM-DD date"),
    })
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl DocumentInput {
    pub const ALIASES: &'static [AliasGroup] = &[
        &["id", "_id"],
        &["number", "invoiceNumber", "billNumber", "poNumber"],
        &["date", "invoiceDate", "billDate", "orderDate"],
        &["partyName", "customerName", "supplierName", "vendorName"],
        &["notes", "remarks"],
        &["lines", "items"],
    ];

    /// Reads a form payload; anything that is not an object is an empty form.
    ///
    /// A payload carrying two names for one field keeps the first filled
    /// one, so a stray duplicate never empties the record.
    pub fn from_value(value: Value) -> Self {
        let value = coerce::resolve_aliases(value, Self::ALIASES);
        let value = coerce::resolve_aliases(value, HeaderInput::ALIASES);
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.lines.iter().cloned().map(LineItem::from).collect()
    }

    pub fn header_inputs(&self) -> HeaderInputs {
        self.header.clone().into()
    }

    /// Header amount paid plus every payment row.
    ///
    /// Matches [`Document::amount_paid`] for the document this form builds;
    /// blank rows are zero and add nothing.
    pub fn amount_paid(&self) -> Money {
        self.header.amount_paid + self.payments.iter().map(|p| p.amount).sum::<Money>()
    }

    /// Totals straight from the form, for recalculation on every edit.
    pub fn totals(&self, calculator: &TotalsCalculator) -> DocumentTotals {
        let header = HeaderInputs {
            amount_paid: self.amount_paid(),
            ..self.header_inputs()
        };
        calculator.compute(&self.line_items(), &header)
    }

    /// Builds a typed document for submission.
    ///
    /// ## Errors
    /// - `Required` when the date is blank
    /// - `InvalidFormat` for a malformed id or date
    ///
    /// Payment rows with no amount are blank form rows and are dropped; a
    /// payment without a date takes the document date.
    pub fn into_document(self, kind: DocumentKind) -> Result<Document, ValidationError> {
        let id = match non_empty(self.id.clone()) {
            Some(id) => Some(Uuid::parse_str(&id).map_err(|_| ValidationError::InvalidFormat {
                field: "id".to_string(),
                reason: "must be a valid UUID".to_string(),
            })?),
            None => None,
        };

        let date = match non_empty(self.date.clone()) {
            Some(date) => parse_date("date", &date)?,
            None => {
                return Err(ValidationError::Required {
                    field: "date".to_string(),
                })
            }
        };
        let due_date = non_empty(self.due_date.clone())
            .map(|d| parse_date("due date", &d))
            .transpose()?;

        let lines = self.line_items();
        let header = self.header_inputs();

        let mut payments = Vec::with_capacity(self.payments.len());
        for row in self.payments {
            if row.amount.is_zero() {
                continue;
            }
            let paid_on = match non_empty(row.paid_on) {
                Some(text) => parse_date("payment date", &text)?,
                None => date,
            };
            let method = PaymentMethod::from_label(&row.method).unwrap_or_default();
            payments.push(Payment {
                amount: row.amount,
                paid_on,
                method,
                reference: non_empty(row.reference),
            });
        }

        Ok(Document {
            id,
            kind,
            number: self.number.trim().to_string(),
            date,
            due_date,
            party_name: self.party_name.trim().to_string(),
            currency: non_empty(self.currency)
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            notes: non_empty(self.notes),
            lines,
            header,
            payments,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
