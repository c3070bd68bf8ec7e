//! End-to-end checks of the totals contract, driven through the same form
//! payloads the browser posts.

use khata_core::{
    calculate_totals, number_to_words, DocumentInput, DocumentKind, HeaderInputs, LineItem,
    Money, Quantity, TaxRate, TotalsCalculator,
};
use serde_json::json;

fn mixed_lines() -> Vec<LineItem> {
    vec![
        LineItem::new(Quantity::parse("12.345").unwrap(), Money::from_cents(4_050))
            .with_discount(Money::from_cents(1_999))
            .with_tax_rate(TaxRate::from_bps(1_800)),
        LineItem::new(Quantity::from_units(3), Money::from_cents(333))
            .with_discount(Money::from_major(50)),
        LineItem::new(Quantity::from_units(7), Money::from_cents(12_500))
            .with_tax_rate(TaxRate::from_bps(2_800))
            .tax_exempt(),
        LineItem::new(Quantity::from_units(1), Money::from_cents(99))
            .with_tax_rate(TaxRate::from_bps(500)),
        LineItem::new(Quantity::zero(), Money::from_major(1_000))
            .with_tax_rate(TaxRate::from_bps(1_200)),
    ]
}

#[test]
fn zero_quantity_or_rate_yields_zero_amount_and_tax() {
    let calc = TotalsCalculator::with_default_tax_rate(TaxRate::from_bps(500));
    for item in [
        LineItem::new(Quantity::zero(), Money::from_major(250)),
        LineItem::new(Quantity::from_units(4), Money::zero()),
        LineItem::new(Quantity::zero(), Money::zero()).with_tax_rate(TaxRate::from_bps(1_800)),
    ] {
        let line = calc.line(&item, false);
        assert_eq!(line.amount, Money::zero());
        assert_eq!(line.tax_amount, Money::zero());
    }
}

#[test]
fn line_amounts_are_never_negative() {
    let totals = calculate_totals(&mixed_lines(), &HeaderInputs::default());
    for line in &totals.lines {
        assert!(!line.amount.is_negative());
        assert!(!line.tax_amount.is_negative());
    }
    assert_eq!(totals.lines[1].amount, Money::zero());
}

#[test]
fn tax_exempt_lines_pay_no_tax() {
    let calc = TotalsCalculator::with_default_tax_rate(TaxRate::from_bps(1_800));
    let totals = calc.compute(&mixed_lines(), &HeaderInputs::default());
    assert_eq!(totals.lines[2].tax_amount, Money::zero());
    assert_eq!(totals.lines[2].amount, Money::from_major(875));
}

#[test]
fn recomputing_is_idempotent() {
    let lines = mixed_lines();
    let header = HeaderInputs {
        header_discount: Money::from_major(25),
        other_charges: Money::from_cents(1_050),
        gross_net_mode: true,
        amount_paid: Money::from_major(100),
    };
    let calc = TotalsCalculator::with_default_tax_rate(TaxRate::from_bps(500));

    let first = calc.compute(&lines, &header);
    let second = calc.compute(&lines, &header);
    assert_eq!(first, second);
}

#[test]
fn discount_is_subtracted_exactly_once() {
    let lines = mixed_lines();
    for (header_discount, other_charges) in [(0, 0), (25, 0), (0, 1_050), (10_000, 300)] {
        let header = HeaderInputs {
            header_discount: Money::from_major(header_discount),
            other_charges: Money::from_cents(other_charges),
            ..Default::default()
        };
        let totals = calculate_totals(&lines, &header);
        let line_value: Money = lines
            .iter()
            .map(|l| l.rate.multiply_quantity(l.quantity))
            .sum();

        assert_eq!(
            totals.net_total,
            line_value - totals.total_discount + totals.total_tax + totals.other_charges
        );
    }
}

#[test]
fn words_use_indian_scale() {
    assert_eq!(number_to_words(0), "Zero");
    assert_eq!(number_to_words(100), "One Hundred");
    assert_eq!(number_to_words(100_000), "One Lakh");
}

#[test]
fn single_taxed_line_from_form() {
    let form = DocumentInput::from_value(json!({
        "lines": [{ "quantity": 10, "rate": 10, "discount": 0, "taxRate": 5, "taxExempt": false }],
        "otherCharges": 0,
        "headerDiscount": 0
    }));
    let totals = form.totals(&TotalsCalculator::new());

    assert_eq!(totals.sub_total, Money::from_major(100));
    assert_eq!(totals.total_tax, Money::from_major(5));
    assert_eq!(totals.net_total, Money::from_major(105));
}

#[test]
fn discounted_and_taxed_lines_from_form() {
    let form = DocumentInput::from_value(json!({
        "items": [
            { "qty": 2, "rate": 50, "discount": 10, "tax": 0 },
            { "qty": 1, "rate": 200, "discount": 0, "tax": "5" }
        ]
    }));
    let totals = form.totals(&TotalsCalculator::new());

    assert_eq!(totals.lines[0].amount, Money::from_major(90));
    assert_eq!(totals.lines[1].amount, Money::from_major(200));
    assert_eq!(totals.lines[1].tax_amount, Money::from_major(10));
    assert_eq!(totals.sub_total, Money::from_major(290));
    assert_eq!(totals.total_tax, Money::from_major(10));
    assert_eq!(totals.net_total, Money::from_major(300));
}

#[test]
fn every_document_kind_shares_one_contract() {
    let form = json!({
        "number": "X-1",
        "date": "2024-06-30",
        "partyName": "Acme",
        "items": [{ "qty": "1.5", "rate": "80", "tax": "12" }],
        "otherCharges": "5"
    });
    let calc = TotalsCalculator::new();
    let expected = DocumentInput::from_value(form.clone()).totals(&calc);

    for kind in DocumentKind::ALL {
        let doc = DocumentInput::from_value(form.clone()).into_document(kind).unwrap();
        assert_eq!(doc.totals(&calc), expected);
    }
    assert_eq!(expected.net_total, Money::from_major(139) + Money::from_cents(40));
}
