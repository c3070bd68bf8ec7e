//! # Line Items
//!
//! The typed line model the calculator consumes, and the lenient form
//! payload it is built from.
//!
//! ## Two Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Browser form row (JSON)         LineItemInput            LineItem     │
//! │  ───────────────────────         ─────────────            ────────     │
//! │  { "qty": "2",            ──►    quantity: 2.000   ──►    typed,       │
//! │    "price": 50,                  rate: 50.00              serialized   │
//! │    "discount": "",               discount: 0.00           as minor     │
//! │    "tax": "5",                   tax_rate: Some(5%)       units        │
//! │    "amount": 105 }               (derived fields ignored)              │
//! │                                                                         │
//! │  Field names drift between modules, so common aliases are accepted.   │
//! │  Anything non-numeric is zero; nothing here ever fails.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::coerce::{self, AliasGroup};
use crate::money::Money;
use crate::types::{Quantity, TaxRate};

// =============================================================================
// LineItem
// =============================================================================

/// One line of an invoice, bill, debit note or purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Item name or free-text description.
    #[serde(default)]
    pub description: String,

    /// Gross (or plain) quantity.
    pub quantity: Quantity,

    /// Net quantity, billed instead of `quantity` when gross/net mode is on.
    #[serde(default)]
    pub net_quantity: Option<Quantity>,

    /// Unit price.
    pub rate: Money,

    /// Absolute discount on this line (not a percentage).
    #[serde(default)]
    pub discount: Money,

    /// Tax rate; `None` falls back to the calculator's default.
    #[serde(default)]
    pub tax_rate: Option<TaxRate>,

    /// Overrides `tax_rate` to zero.
    #[serde(default)]
    pub tax_exempt: bool,
}

impl LineItem {
    /// Creates an undiscounted line with no tax rate selected.
    pub fn new(quantity: Quantity, rate: Money) -> Self {
        LineItem {
            quantity,
            rate,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_net_quantity(mut self, net: Quantity) -> Self {
        self.net_quantity = Some(net);
        self
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    pub fn tax_exempt(mut self) -> Self {
        self.tax_exempt = true;
        self
    }

    /// The quantity that bills.
    ///
    /// With gross/net mode on, a nonzero net quantity wins; otherwise the
    /// plain quantity is used.
    pub fn effective_quantity(&self, gross_net_mode: bool) -> Quantity {
        match self.net_quantity {
            Some(net) if gross_net_mode && !net.is_zero() => net,
            _ => self.quantity,
        }
    }
}

// =============================================================================
// LineItemInput (lenient form payload)
// =============================================================================

/// A line item exactly as a form posts it.
///
/// Derived fields the form may echo back (`amount`, `taxAmount`) are
/// ignored; they are always recomputed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: String,

    #[serde(default, deserialize_with = "coerce::quantity")]
    pub quantity: Quantity,

    #[serde(default, deserialize_with = "coerce::optional_quantity")]
    pub net_quantity: Option<Quantity>,

    #[serde(default, deserialize_with = "coerce::money")]
    pub rate: Money,

    #[serde(default, deserialize_with = "coerce::money")]
    pub discount: Money,

    #[serde(default, deserialize_with = "coerce::optional_tax_rate")]
    pub tax_rate: Option<TaxRate>,

    #[serde(default, deserialize_with = "coerce::flag")]
    pub tax_exempt: bool,
}

impl From<LineItemInput> for LineItem {
    fn from(input: LineItemInput) -> Self {
        LineItem {
            description: input.description.trim().to_string(),
            quantity: input.quantity,
            net_quantity: input.net_quantity,
            rate: input.rate,
            discount: input.discount,
            tax_rate: input.tax_rate,
            tax_exempt: input.tax_exempt,
        }
    }
}

impl LineItemInput {
    pub const ALIASES: &'static [AliasGroup] = &[
        &["description", "itemName", "name"],
        &["quantity", "qty"],
        &["netQuantity", "netWeight", "netQty"],
        &["rate", "price", "unitPrice"],
        &["discount", "discountAmount"],
        &["taxRate", "tax", "taxPercent", "gstRate"],
        &["taxExempt", "exempt", "isTaxExempt"],
    ];

    /// Reads one row, treating a malformed row as an all-zero line.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(coerce::resolve_aliases(value, Self::ALIASES)).unwrap_or_default()
    }
}

/// `deserialize_with` adapter for a list of form rows.
///
/// A row that is not an object (or has the wrong shape) becomes a zero
/// line so row indices still line up with the form. A missing or non-array
/// value is an empty list.
pub fn lenient_lines<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<LineItemInput>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(rows) => rows.into_iter().map(LineItemInput::from_value).collect(),
        _ => Vec::new(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_quantity() {
        let line = LineItem::new(Quantity::from_units(12), Money::from_major(10))
            .with_net_quantity(Quantity::from_units(10));

        assert_eq!(line.effective_quantity(false), Quantity::from_units(12));
        assert_eq!(line.effective_quantity(true), Quantity::from_units(10));
    }

    #[test]
    fn test_effective_quantity_zero_net_falls_back() {
        let line = LineItem::new(Quantity::from_units(12), Money::from_major(10))
            .with_net_quantity(Quantity::zero());
        assert_eq!(line.effective_quantity(true), Quantity::from_units(12));

        let line = LineItem::new(Quantity::from_units(12), Money::from_major(10));
        assert_eq!(line.effective_quantity(true), Quantity::from_units(12));
    }

    #[test]
    fn test_input_with_aliases() {
        let input = LineItemInput::from_value(json!({
            "itemName": "  Basmati Rice ",
            "qty": "2",
            "price": 50,
            "discount": "10",
            "tax": "5",
            "amount": 999
        }));
        let line = LineItem::from(input);

        assert_eq!(line.description, "Basmati Rice");
        assert_eq!(line.quantity, Quantity::from_units(2));
        assert_eq!(line.rate, Money::from_major(50));
        assert_eq!(line.discount, Money::from_major(10));
        assert_eq!(line.tax_rate, Some(TaxRate::from_bps(500)));
        assert!(!line.tax_exempt);
    }

    #[test]
    fn test_input_with_both_names_for_a_field() {
        let line = LineItem::from(LineItemInput::from_value(json!({
            "qty": 2,
            "quantity": 2,
            "rate": 50,
            "price": "",
            "tax": 5,
            "taxRate": 12
        })));

        assert_eq!(line.quantity, Quantity::from_units(2));
        assert_eq!(line.rate, Money::from_major(50));
        assert_eq!(line.tax_rate, Some(TaxRate::from_bps(1200)));
    }

    #[test]
    fn test_input_missing_and_garbage_fields_are_zero() {
        let input: LineItemInput = serde_json::from_value(json!({
            "quantity": "lots",
            "rate": null,
            "taxExempt": "yes"
        }))
        .unwrap();
        let line = LineItem::from(input);

        assert!(line.quantity.is_zero());
        assert!(line.rate.is_zero());
        assert!(line.discount.is_zero());
        assert_eq!(line.tax_rate, None);
        assert!(line.tax_exempt);
    }

    #[test]
    fn test_lenient_lines_keeps_row_positions() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(default, deserialize_with = "lenient_lines")]
            lines: Vec<LineItemInput>,
        }

        let form: Form = serde_json::from_value(json!({
            "lines": [{ "qty": 1, "rate": 5 }, null, "oops", { "qty": 2, "rate": 3 }]
        }))
        .unwrap();
        assert_eq!(form.lines.len(), 4);
        assert!(form.lines[1].rate.is_zero());
        assert_eq!(form.lines[3].rate, Money::from_major(3));

        let form: Form = serde_json::from_value(json!({ "lines": "none" })).unwrap();
        assert!(form.lines.is_empty());
    }

    #[test]
    fn test_typed_line_serializes_camel_case() {
        let line = LineItem::new(Quantity::from_units(1), Money::from_cents(250)).tax_exempt();
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["rate"], json!(250));
        assert_eq!(json["taxExempt"], json!(true));
        assert_eq!(json["netQuantity"], json!(null));
    }
}
