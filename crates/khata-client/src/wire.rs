//! # Wire Format
//!
//! The backend speaks JSON with camelCase keys and amounts as plain
//! major-unit numbers (`105.5`, not `10550`). Outgoing bodies are built
//! here; incoming bodies are read leniently through the core form types.
//!
//! ```text
//! Document ──► DocumentBody { ..fields, lines, payments, totals } ──► POST/PUT
//!                                          ▲
//!                   DocumentTotals ────────┘  (recomputed, never trusted)
//! ```

use khata_core::coerce::{self, AliasGroup};
use khata_core::{
    Document, DocumentTotals, LineItem, Money, Payment, PaymentMethod, PaymentStatus, Quantity,
    TaxRate,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

fn major(amount: Money) -> f64 {
    amount.cents() as f64 / 100.0
}

fn units(quantity: Quantity) -> f64 {
    quantity.thousandths() as f64 / 1000.0
}

fn percent(rate: TaxRate) -> f64 {
    rate.percentage()
}

// =============================================================================
// Outgoing Bodies
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBody {
    pub description: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_quantity: Option<f64>,
    pub rate: f64,
    pub discount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    pub tax_exempt: bool,
    /// Recomputed line amount after discount.
    pub amount: f64,
    pub tax_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    pub amount: f64,
    pub paid_on: String,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl From<&Payment> for PaymentBody {
    fn from(payment: &Payment) -> Self {
        PaymentBody {
            amount: major(payment.amount),
            paid_on: payment.paid_on.to_string(),
            method: payment.method,
            reference: payment.reference.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsBody {
    pub sub_total: f64,
    pub total_discount: f64,
    pub total_tax: f64,
    pub other_charges: f64,
    pub gross_total: f64,
    pub net_total: f64,
    pub amount_paid: f64,
    pub balance_due: f64,
    pub payment_status: PaymentStatus,
}

impl From<&DocumentTotals> for TotalsBody {
    fn from(totals: &DocumentTotals) -> Self {
        TotalsBody {
            sub_total: major(totals.sub_total),
            total_discount: major(totals.total_discount),
            total_tax: major(totals.total_tax),
            other_charges: major(totals.other_charges),
            gross_total: major(totals.gross_total),
            net_total: major(totals.net_total),
            amount_paid: major(totals.amount_paid),
            balance_due: major(totals.balance_due),
            payment_status: totals.payment_status(),
        }
    }
}

/// A document as the create and update endpoints expect it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub number: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub party_name: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub gross_net_mode: bool,
    pub header_discount: f64,
    pub other_charges: f64,
    pub amount_paid: f64,
    pub lines: Vec<LineBody>,
    pub payments: Vec<PaymentBody>,
    pub totals: TotalsBody,
}

impl DocumentBody {
    /// Builds the body from a document and totals computed for it.
    pub fn new(document: &Document, totals: &DocumentTotals) -> Self {
        let lines = document
            .lines
            .iter()
            .zip(&totals.lines)
            .map(|(item, amounts)| line_body(item, amounts.amount, amounts.tax_amount))
            .collect();

        DocumentBody {
            id: document.id,
            number: document.number.clone(),
            date: document.date.to_string(),
            due_date: document.due_date.map(|d| d.to_string()),
            party_name: document.party_name.clone(),
            currency: document.currency.clone(),
            notes: document.notes.clone(),
            gross_net_mode: document.header.gross_net_mode,
            header_discount: major(document.header.header_discount),
            other_charges: major(document.header.other_charges),
            amount_paid: major(document.header.amount_paid),
            lines,
            payments: document.payments.iter().map(PaymentBody::from).collect(),
            totals: TotalsBody::from(totals),
        }
    }
}

fn line_body(item: &LineItem, amount: Money, tax_amount: Money) -> LineBody {
    LineBody {
        description: item.description.clone(),
        quantity: units(item.quantity),
        net_quantity: item.net_quantity.map(units),
        rate: major(item.rate),
        discount: major(item.discount),
        tax_rate: item.tax_rate.map(percent),
        tax_exempt: item.tax_exempt,
        amount: major(amount),
        tax_amount: major(tax_amount),
    }
}

// =============================================================================
// Incoming Bodies
// =============================================================================

/// One row of a list view.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListItem {
    #[serde(default, deserialize_with = "coerce::text")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub number: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub date: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub party_name: String,
    #[serde(default, deserialize_with = "coerce::money")]
    pub net_total: Money,
    #[serde(default, deserialize_with = "coerce::money")]
    pub balance_due: Money,
    #[serde(default, deserialize_with = "coerce::text")]
    pub status: String,
}

impl DocumentListItem {
    const ALIASES: &'static [AliasGroup] = &[
        &["id", "_id"],
        &["number", "invoiceNumber", "billNumber", "poNumber"],
        &["date", "invoiceDate", "billDate", "orderDate"],
        &["partyName", "customerName", "supplierName", "vendorName"],
        &["netTotal", "grandTotal", "total"],
        &["balanceDue", "balance"],
    ];

    /// Reads one list row; a row of the wrong shape is an empty item.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(coerce::resolve_aliases(value, Self::ALIASES)).unwrap_or_default()
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Total rows across pages, when the backend reports it.
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// Whether another page is likely to exist.
    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => u64::from(self.page) * u64::from(self.page_size) < total,
            None => self.items.len() as u64 >= u64::from(self.page_size),
        }
    }
}

/// A list response: either a bare array or an envelope object.
#[derive(Debug, Default)]
pub(crate) struct ListEnvelope {
    pub rows: Vec<Value>,
    pub total: Option<u64>,
}

impl<'de> Deserialize<'de> for ListEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(rows) => ListEnvelope { rows, total: None },
            Value::Object(mut map) => {
                let rows = ["items", "data", "results", "docs"]
                    .iter()
                    .find_map(|key| match map.remove(*key) {
                        Some(Value::Array(rows)) => Some(rows),
                        _ => None,
                    })
                    .unwrap_or_default();
                let total = ["total", "count", "totalDocs"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_u64));
                ListEnvelope { rows, total }
            }
            _ => ListEnvelope::default(),
        })
    }
}

/// What the backend answers after a create or update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SavedBody {
    #[serde(default, deserialize_with = "coerce::text")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub number: String,
}

impl SavedBody {
    const ALIASES: &'static [AliasGroup] = &[
        &["id", "_id"],
        &["number", "invoiceNumber", "billNumber", "poNumber"],
    ];

    /// Reads a save response, unwrapping any record envelope first.
    pub(crate) fn from_value(value: Value) -> Self {
        serde_json::from_value(coerce::resolve_aliases(unwrap_record(value), Self::ALIASES))
            .unwrap_or_default()
    }
}

/// Unwraps `{ "data": {...} }` style envelopes around a single record.
pub(crate) fn unwrap_record(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() <= 3 => {
            for key in ["data", "document", "result"] {
                if let Some(inner @ Value::Object(_)) = map.remove(key) {
                    return inner;
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use khata_core::{DocumentInput, DocumentKind, HeaderInputs, TotalsCalculator};
    use serde_json::json;

    fn invoice() -> Document {
        let mut doc = Document::new(
            DocumentKind::SalesInvoice,
            "INV-7",
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        )
        .with_party("Acme Traders")
        .with_line(
            LineItem::new(Quantity::parse("2.5").unwrap(), Money::from_cents(4_000))
                .with_discount(Money::from_major(10))
                .with_tax_rate(TaxRate::from_bps(1_800)),
        );
        doc.header = HeaderInputs {
            other_charges: Money::from_cents(1_050),
            ..Default::default()
        };
        doc
    }

    #[test]
    fn test_body_uses_major_units() {
        let doc = invoice();
        let totals = doc.totals(&TotalsCalculator::new());
        let body = serde_json::to_value(DocumentBody::new(&doc, &totals)).unwrap();

        assert_eq!(body["partyName"], "Acme Traders");
        assert_eq!(body["otherCharges"], json!(10.5));
        assert_eq!(body["lines"][0]["quantity"], json!(2.5));
        assert_eq!(body["lines"][0]["rate"], json!(40.0));
        assert_eq!(body["lines"][0]["taxRate"], json!(18.0));
        assert_eq!(body["lines"][0]["amount"], json!(90.0));
        assert_eq!(body["totals"]["totalTax"], json!(16.2));
        assert_eq!(body["totals"]["netTotal"], json!(116.7));
        assert_eq!(body["totals"]["paymentStatus"], "unpaid");
        assert!(body.get("id").is_none());
    }

    #[test]
    fn test_body_reads_back_as_form() {
        let doc = invoice();
        let calc = TotalsCalculator::new();
        let totals = doc.totals(&calc);
        let body = serde_json::to_value(DocumentBody::new(&doc, &totals)).unwrap();

        let again = DocumentInput::from_value(body)
            .into_document(DocumentKind::SalesInvoice)
            .unwrap();
        assert_eq!(again, doc);
        assert_eq!(again.totals(&calc), totals);
    }

    #[test]
    fn test_list_envelopes() {
        let bare: ListEnvelope = serde_json::from_value(json!([{ "_id": "a" }])).unwrap();
        assert_eq!(bare.rows.len(), 1);
        assert_eq!(bare.total, None);

        let wrapped: ListEnvelope =
            serde_json::from_value(json!({ "data": [{}, {}], "total": 40 })).unwrap();
        assert_eq!(wrapped.rows.len(), 2);
        assert_eq!(wrapped.total, Some(40));

        let odd: ListEnvelope = serde_json::from_value(json!("nope")).unwrap();
        assert!(odd.rows.is_empty());
    }

    #[test]
    fn test_list_item_aliases() {
        let row = DocumentListItem::from_value(json!({
            "_id": "65f0",
            "invoiceNumber": "INV-1",
            "customerName": "Acme",
            "grandTotal": "1050.00",
            "status": "paid"
        }));
        assert_eq!(row.id, "65f0");
        assert_eq!(row.number, "INV-1");
        assert_eq!(row.party_name, "Acme");
        assert_eq!(row.net_total, Money::from_major(1_050));
    }

    #[test]
    fn test_list_item_with_id_and_underscore_id() {
        let row = DocumentListItem::from_value(json!({
            "id": "65f0",
            "_id": "65f0",
            "number": "INV-2",
            "grandTotal": 500,
            "total": 500,
            "balance": 120
        }));
        assert_eq!(row.id, "65f0");
        assert_eq!(row.number, "INV-2");
        assert_eq!(row.net_total, Money::from_major(500));
        assert_eq!(row.balance_due, Money::from_major(120));
    }

    #[test]
    fn test_saved_body_with_both_ids() {
        let saved = SavedBody::from_value(json!({
            "data": { "id": "abc", "_id": "abc", "invoiceNumber": "INV-3" }
        }));
        assert_eq!(saved.id, "abc");
        assert_eq!(saved.number, "INV-3");
    }

    #[test]
    fn test_page_has_more() {
        let page = Page {
            items: vec![1, 2],
            page: 1,
            page_size: 2,
            total: Some(3),
        };
        assert!(page.has_more());

        let last = Page {
            items: vec![3],
            page: 2,
            page_size: 2,
            total: None,
        };
        assert!(!last.has_more());
    }

    #[test]
    fn test_unwrap_record() {
        let inner = unwrap_record(json!({ "success": true, "data": { "number": "B-1" } }));
        assert_eq!(inner["number"], "B-1");

        let plain = unwrap_record(json!({ "number": "B-2" }));
        assert_eq!(plain["number"], "B-2");
    }
}
