//! # Document Totals
//!
//! The one shared totals contract for invoices, bills, debit notes and
//! purchase orders.
//!
//! ## Discount Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line amounts are NET of the line discount. The discount is taken once │
//! │  at the line and only *reported* in totalDiscount afterwards.          │
//! │                                                                         │
//! │  per line:                                                             │
//! │    gross    = max(0, effectiveQty × rate)                              │
//! │    discount = min(lineDiscount, gross)                                 │
//! │    amount   = gross - discount              (never negative)           │
//! │    tax      = exempt ? 0 : amount × taxRate                            │
//! │                                                                         │
//! │  document:                                                             │
//! │    subTotal      = Σ amount                                            │
//! │    headerApplied = min(headerDiscount, subTotal)                       │
//! │    grossTotal    = subTotal - headerApplied                            │
//! │    totalDiscount = Σ discount + headerApplied      (display only)      │
//! │    netTotal      = grossTotal + totalTax + otherCharges                │
//! │    balanceDue    = netTotal - amountPaid                               │
//! │                                                                         │
//! │  ⇒ netTotal == Σ gross - totalDiscount + totalTax + otherCharges       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line tax is computed on the line amount; the header discount reduces
//! the document total but not the per-line tax base.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;
use ts_rs::TS;

use crate::coerce::{self, AliasGroup};
use crate::line_item::LineItem;
use crate::money::Money;
use crate::payment::PaymentStatus;
use crate::types::{Quantity, TaxRate};

// =============================================================================
// Header Inputs
// =============================================================================

/// Document-level inputs that feed the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInputs {
    /// Flat discount on the whole document.
    #[serde(default)]
    pub header_discount: Money,

    /// Flat addition (freight, packing, round-off).
    #[serde(default)]
    pub other_charges: Money,

    /// Bill on net quantity where a line has one.
    #[serde(default)]
    pub gross_net_mode: bool,

    /// Amount received or paid when the document was raised.
    #[serde(default)]
    pub amount_paid: Money,
}

/// [`HeaderInputs`] as a form posts them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInput {
    #[serde(default, deserialize_with = "coerce::money")]
    pub header_discount: Money,

    #[serde(default, deserialize_with = "coerce::money")]
    pub other_charges: Money,

    #[serde(default, deserialize_with = "coerce::flag")]
    pub gross_net_mode: bool,

    #[serde(default, deserialize_with = "coerce::money")]
    pub amount_paid: Money,
}

impl HeaderInput {
    pub const ALIASES: &'static [AliasGroup] = &[
        &["headerDiscount", "discount"],
        &["otherCharges", "charges"],
        &["grossNetMode", "useNetWeight", "netWeightEnabled"],
        &["amountPaid", "amountReceived", "paidAmount"],
    ];
}

impl From<HeaderInput> for HeaderInputs {
    fn from(input: HeaderInput) -> Self {
        HeaderInputs {
            header_discount: input.header_discount,
            other_charges: input.other_charges,
            gross_net_mode: input.gross_net_mode,
            amount_paid: input.amount_paid,
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// Derived figures for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineAmounts {
    pub effective_quantity: Quantity,
    /// `effectiveQuantity × rate`, floored at zero.
    pub gross: Money,
    /// Discount actually taken (capped at `gross`).
    pub discount: Money,
    /// Net contribution to the subtotal.
    pub amount: Money,
    /// Rate actually applied (zero when exempt).
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
}

/// Taxable value and tax collected at one rate, for the printed tax summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxBand {
    pub rate: TaxRate,
    pub taxable: Money,
    pub tax: Money,
}

/// Totals for one invoice, bill, debit note or purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    pub lines: Vec<LineAmounts>,
    pub sub_total: Money,
    pub total_discount: Money,
    pub total_tax: Money,
    pub other_charges: Money,
    pub gross_total: Money,
    pub net_total: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
}

impl DocumentTotals {
    /// Σ gross line value before any discount.
    pub fn line_value(&self) -> Money {
        self.lines.iter().map(|l| l.gross).sum()
    }

    /// Header discount actually applied.
    pub fn header_discount(&self) -> Money {
        self.sub_total - self.gross_total
    }

    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::from_amounts(self.net_total, self.amount_paid)
    }

    /// Taxable value and tax grouped by rate, ascending. Exempt and
    /// zero-rated lines form the 0% band.
    pub fn tax_bands(&self) -> Vec<TaxBand> {
        let mut bands: BTreeMap<TaxRate, (Money, Money)> = BTreeMap::new();
        for line in &self.lines {
            let entry = bands.entry(line.tax_rate).or_default();
            entry.0 += line.amount;
            entry.1 += line.tax_amount;
        }
        bands
            .into_iter()
            .map(|(rate, (taxable, tax))| TaxBand { rate, taxable, tax })
            .collect()
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Derives [`DocumentTotals`] from line items and header inputs.
///
/// Stateless apart from configuration: the same input always yields the
/// same totals, so forms recompute on every keystroke.
///
/// ## Example
/// ```rust
/// use khata_core::line_item::LineItem;
/// use khata_core::money::Money;
/// use khata_core::totals::{HeaderInputs, TotalsCalculator};
/// use khata_core::types::{Quantity, TaxRate};
///
/// let calc = TotalsCalculator::with_default_tax_rate(TaxRate::from_bps(500));
/// let lines = [LineItem::new(Quantity::from_units(10), Money::from_major(10))];
/// let totals = calc.compute(&lines, &HeaderInputs::default());
///
/// assert_eq!(totals.sub_total, Money::from_major(100));
/// assert_eq!(totals.total_tax, Money::from_major(5));
/// assert_eq!(totals.net_total, Money::from_major(105));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TotalsCalculator {
    default_tax_rate: TaxRate,
}

impl TotalsCalculator {
    /// Calculator whose unselected tax rate is zero.
    pub const fn new() -> Self {
        TotalsCalculator {
            default_tax_rate: TaxRate::zero(),
        }
    }

    /// Calculator with a module default tax rate (e.g. 5% on purchase orders).
    pub const fn with_default_tax_rate(rate: TaxRate) -> Self {
        TotalsCalculator {
            default_tax_rate: rate,
        }
    }

    pub const fn default_tax_rate(&self) -> TaxRate {
        self.default_tax_rate
    }

    /// Derives the figures for one line.
    pub fn line(&self, item: &LineItem, gross_net_mode: bool) -> LineAmounts {
        let effective_quantity = item.effective_quantity(gross_net_mode);
        let gross = item.rate.multiply_quantity(effective_quantity).non_negative();
        let discount = item.discount.non_negative().min(gross);
        let amount = gross - discount;

        let tax_rate = if item.tax_exempt {
            TaxRate::zero()
        } else {
            item.tax_rate.unwrap_or(self.default_tax_rate)
        };
        let tax_amount = amount.calculate_tax(tax_rate);

        LineAmounts {
            effective_quantity,
            gross,
            discount,
            amount,
            tax_rate,
            tax_amount,
        }
    }

    /// Derives the document totals.
    pub fn compute(&self, items: &[LineItem], header: &HeaderInputs) -> DocumentTotals {
        let lines: Vec<LineAmounts> = items
            .iter()
            .map(|item| self.line(item, header.gross_net_mode))
            .collect();

        let mut sub_total = Money::zero();
        let mut line_discount = Money::zero();
        let mut total_tax = Money::zero();
        for line in &lines {
            sub_total += line.amount;
            line_discount += line.discount;
            total_tax += line.tax_amount;
        }

        let header_discount = header.header_discount.non_negative().min(sub_total);
        let gross_total = sub_total - header_discount;
        let net_total = gross_total + total_tax + header.other_charges;
        let balance_due = net_total - header.amount_paid;

        trace!(
            lines = lines.len(),
            sub_total = sub_total.cents(),
            total_tax = total_tax.cents(),
            net_total = net_total.cents(),
            "Document totals computed"
        );

        DocumentTotals {
            lines,
            sub_total,
            total_discount: line_discount + header_discount,
            total_tax,
            other_charges: header.other_charges,
            gross_total,
            net_total,
            amount_paid: header.amount_paid,
            balance_due,
        }
    }
}

/// Computes totals with no default tax rate.
pub fn calculate_totals(items: &[LineItem], header: &HeaderInputs) -> DocumentTotals {
    TotalsCalculator::new().compute(items, header)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: i64, rate: i64) -> LineItem {
        LineItem::new(Quantity::from_units(qty), Money::from_major(rate))
    }

    #[test]
    fn test_empty_document_is_all_zero() {
        let totals = calculate_totals(&[], &HeaderInputs::default());
        assert_eq!(totals, DocumentTotals::default());
        assert!(totals.tax_bands().is_empty());
    }

    #[test]
    fn test_single_line_with_tax() {
        let items = [line(10, 10).with_tax_rate(TaxRate::from_bps(500))];
        let totals = calculate_totals(&items, &HeaderInputs::default());

        assert_eq!(totals.sub_total, Money::from_major(100));
        assert_eq!(totals.total_tax, Money::from_major(5));
        assert_eq!(totals.net_total, Money::from_major(105));
        assert_eq!(totals.balance_due, Money::from_major(105));
    }

    #[test]
    fn test_discount_is_taken_once() {
        let items = [
            line(2, 50).with_discount(Money::from_major(10)),
            line(1, 200).with_tax_rate(TaxRate::from_bps(500)),
        ];
        let totals = calculate_totals(&items, &HeaderInputs::default());

        assert_eq!(totals.lines[0].amount, Money::from_major(90));
        assert_eq!(totals.lines[1].amount, Money::from_major(200));
        assert_eq!(totals.lines[1].tax_amount, Money::from_major(10));
        assert_eq!(totals.sub_total, Money::from_major(290));
        assert_eq!(totals.total_discount, Money::from_major(10));
        assert_eq!(totals.total_tax, Money::from_major(10));
        assert_eq!(totals.gross_total, Money::from_major(290));
        assert_eq!(totals.net_total, Money::from_major(300));
    }

    #[test]
    fn test_oversized_discount_clamps_line_to_zero() {
        let items = [line(1, 10)
            .with_discount(Money::from_major(25))
            .with_tax_rate(TaxRate::from_bps(1800))];
        let totals = calculate_totals(&items, &HeaderInputs::default());

        assert_eq!(totals.lines[0].amount, Money::zero());
        assert_eq!(totals.lines[0].tax_amount, Money::zero());
        assert_eq!(totals.lines[0].discount, Money::from_major(10));
        assert_eq!(totals.net_total, Money::zero());
    }

    #[test]
    fn test_negative_discount_is_ignored() {
        let items = [line(1, 10).with_discount(Money::from_major(-5))];
        let totals = calculate_totals(&items, &HeaderInputs::default());
        assert_eq!(totals.sub_total, Money::from_major(10));
        assert_eq!(totals.total_discount, Money::zero());
    }

    #[test]
    fn test_tax_exempt_overrides_rate() {
        let items = [line(3, 100).with_tax_rate(TaxRate::from_bps(2800)).tax_exempt()];
        let calc = TotalsCalculator::with_default_tax_rate(TaxRate::from_bps(500));
        let totals = calc.compute(&items, &HeaderInputs::default());

        assert_eq!(totals.total_tax, Money::zero());
        assert_eq!(totals.lines[0].tax_rate, TaxRate::zero());
    }

    #[test]
    fn test_default_tax_rate_applies_only_when_unselected() {
        let calc = TotalsCalculator::with_default_tax_rate(TaxRate::from_bps(500));
        let items = [
            line(1, 100),
            line(1, 100).with_tax_rate(TaxRate::zero()),
        ];
        let totals = calc.compute(&items, &HeaderInputs::default());

        assert_eq!(totals.lines[0].tax_amount, Money::from_major(5));
        assert_eq!(totals.lines[1].tax_amount, Money::zero());
    }

    #[test]
    fn test_gross_net_mode_bills_net_quantity() {
        let items = [LineItem::new(Quantity::from_units(100), Money::from_major(40))
            .with_net_quantity(Quantity::parse("97.5").unwrap())];

        let off = calculate_totals(&items, &HeaderInputs::default());
        assert_eq!(off.sub_total, Money::from_major(4000));

        let header = HeaderInputs {
            gross_net_mode: true,
            ..Default::default()
        };
        let on = calculate_totals(&items, &header);
        assert_eq!(on.sub_total, Money::from_major(3900));
        assert_eq!(on.lines[0].effective_quantity, Quantity::from_thousandths(97_500));
    }

    #[test]
    fn test_header_discount_and_other_charges() {
        let items = [line(4, 250).with_tax_rate(TaxRate::from_bps(1200))];
        let header = HeaderInputs {
            header_discount: Money::from_major(100),
            other_charges: Money::from_major(50),
            amount_paid: Money::from_major(500),
            ..Default::default()
        };
        let totals = calculate_totals(&items, &header);

        assert_eq!(totals.sub_total, Money::from_major(1000));
        assert_eq!(totals.gross_total, Money::from_major(900));
        assert_eq!(totals.header_discount(), Money::from_major(100));
        assert_eq!(totals.total_discount, Money::from_major(100));
        assert_eq!(totals.total_tax, Money::from_major(120));
        assert_eq!(totals.net_total, Money::from_major(1070));
        assert_eq!(totals.balance_due, Money::from_major(570));
        assert_eq!(totals.payment_status(), PaymentStatus::PartiallyPaid);
    }

    #[test]
    fn test_header_discount_capped_at_subtotal() {
        let header = HeaderInputs {
            header_discount: Money::from_major(500),
            ..Default::default()
        };
        let totals = calculate_totals(&[line(1, 100)], &header);
        assert_eq!(totals.gross_total, Money::zero());
        assert_eq!(totals.total_discount, Money::from_major(100));
    }

    #[test]
    fn test_tax_bands_group_by_rate() {
        let items = [
            line(1, 100).with_tax_rate(TaxRate::from_bps(1800)),
            line(1, 50).with_tax_rate(TaxRate::from_bps(500)),
            line(2, 100).with_tax_rate(TaxRate::from_bps(1800)),
            line(1, 20).tax_exempt(),
        ];
        let bands = calculate_totals(&items, &HeaderInputs::default()).tax_bands();

        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].rate, TaxRate::zero());
        assert_eq!(bands[1].rate, TaxRate::from_bps(500));
        assert_eq!(bands[2].taxable, Money::from_major(300));
        assert_eq!(bands[2].tax, Money::from_major(54));
    }

    #[test]
    fn test_line_value_identity() {
        let items = [
            line(3, 33).with_discount(Money::from_major(4)).with_tax_rate(TaxRate::from_bps(825)),
            line(7, 12).with_discount(Money::from_major(100)),
        ];
        let header = HeaderInputs {
            header_discount: Money::from_major(7),
            other_charges: Money::from_cents(1234),
            ..Default::default()
        };
        let t = calculate_totals(&items, &header);
        assert_eq!(
            t.net_total,
            t.line_value() - t.total_discount + t.total_tax + t.other_charges
        );
    }
}
