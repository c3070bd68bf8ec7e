//! `totals` and `print`: offline recalculation of a saved form payload.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Table};
use khata_client::wire::TotalsBody;
use khata_core::currency::format_currency;
use khata_core::{DocumentInput, DocumentKind, DocumentSummary, DocumentTotals};
use tracing::debug;

use crate::config::CliConfig;
use crate::render;

/// Reads a form payload, filling in the configured currency when blank.
pub fn read_form(path: &Path, config: &CliConfig) -> Result<DocumentInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("{} is not JSON", path.display()))?;

    let mut form = DocumentInput::from_value(value);
    if form.currency.trim().is_empty() {
        form.currency = config.currency.clone();
    }
    debug!(lines = form.lines.len(), "Read form payload");
    Ok(form)
}

pub fn totals(config: &CliConfig, path: &Path, kind: DocumentKind, json: bool) -> Result<()> {
    let form = read_form(path, config)?;
    let totals = form.totals(&config.calculator(kind));

    if json {
        println!("{}", serde_json::to_string_pretty(&TotalsBody::from(&totals))?);
    } else {
        println!("{}", totals_table(&totals, form.currency.trim()));
    }
    Ok(())
}

pub fn print(config: &CliConfig, path: &Path, kind: DocumentKind) -> Result<()> {
    let form = read_form(path, config)?;
    let document = form
        .into_document(kind)
        .with_context(|| format!("{} is not a complete document", path.display()))?;

    let totals = document.totals(&config.calculator(kind));
    let suffix = config.suffix_for(&document.currency);
    let summary = DocumentSummary::build_with_suffix(&document, &totals, &suffix);

    println!("{}", render::summary(&summary));
    Ok(())
}

fn totals_table(totals: &DocumentTotals, currency: &str) -> Table {
    let money = |amount| {
        Cell::new(format_currency(amount, currency)).set_alignment(CellAlignment::Right)
    };

    let mut table = Table::new();
    table.set_header(vec!["#", "Qty", "Gross", "Discount", "Amount", "Tax %", "Tax"]);
    for (i, line) in totals.lines.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(line.effective_quantity),
            money(line.gross),
            money(line.discount),
            money(line.amount),
            Cell::new(line.tax_rate),
            money(line.tax_amount),
        ]);
    }

    for (label, amount) in [
        ("Sub Total", totals.sub_total),
        ("Discount", totals.total_discount),
        ("Tax", totals.total_tax),
        ("Other Charges", totals.other_charges),
        ("Net Total", totals.net_total),
        ("Paid", totals.amount_paid),
        ("Balance Due", totals.balance_due),
    ] {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            money(amount),
        ]);
    }
    table
}
