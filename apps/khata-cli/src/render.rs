//! Terminal tables for summaries, payslips and list pages.

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use khata_client::{DocumentListItem, Page};
use khata_core::currency::format_currency;
use khata_core::payroll::ComponentKind;
use khata_core::{DocumentSummary, Payslip};

fn right(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

fn heading(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

pub fn summary(summary: &DocumentSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  {}\n", summary.title, summary.number));
    out.push_str(&format!("Date: {}", summary.date));
    if let Some(due) = &summary.due_date {
        out.push_str(&format!("   Due: {due}"));
    }
    out.push('\n');
    if !summary.party_name.is_empty() {
        out.push_str(&format!("Party: {}\n", summary.party_name));
    }

    let mut lines = Table::new();
    lines.set_header(vec![
        heading("#"),
        heading("Description"),
        heading("Qty"),
        heading("Rate"),
        heading("Discount"),
        heading("Tax %"),
        heading("Tax"),
        heading("Amount"),
    ]);
    for line in &summary.lines {
        lines.add_row(vec![
            Cell::new(line.index),
            Cell::new(&line.description),
            right(line.quantity.clone()),
            right(line.rate.clone()),
            right(line.discount.clone()),
            right(line.tax_rate.clone()),
            right(line.tax_amount.clone()),
            right(line.amount.clone()),
        ]);
    }
    out.push_str(&lines.to_string());
    out.push('\n');

    if !summary.tax_bands.is_empty() {
        let mut bands = Table::new();
        bands.set_header(vec![heading("Tax %"), heading("Taxable"), heading("Tax")]);
        for band in &summary.tax_bands {
            bands.add_row(vec![
                right(band.rate.clone()),
                right(band.taxable.clone()),
                right(band.tax.clone()),
            ]);
        }
        out.push_str(&bands.to_string());
        out.push('\n');
    }

    let mut totals = Table::new();
    for (label, value) in [
        ("Sub Total", &summary.sub_total),
        ("Discount", &summary.total_discount),
        ("Tax", &summary.total_tax),
        ("Other Charges", &summary.other_charges),
    ] {
        totals.add_row(vec![Cell::new(label), right(value.clone())]);
    }
    totals.add_row(vec![heading("Net Total"), right(summary.net_total.clone()).add_attribute(Attribute::Bold)]);
    totals.add_row(vec![Cell::new("Paid"), right(summary.amount_paid.clone())]);
    totals.add_row(vec![
        Cell::new("Balance Due"),
        right(summary.balance_due.clone()).fg(Color::Rgb { r: 185, g: 28, b: 28 }),
    ]);
    totals.add_row(vec![Cell::new("Status"), right(summary.status.clone())]);
    out.push_str(&totals.to_string());
    out.push('\n');

    out.push_str(&summary.amount_in_words);
    if let Some(notes) = &summary.notes {
        out.push_str(&format!("\nNotes: {notes}"));
    }
    out
}

pub fn payslip(slip: &Payslip, currency: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec![heading("Component"), heading("Earning"), heading("Deduction")]);
    // earnings first, then deductions
    for line in slip.earnings().chain(slip.deductions()) {
        let amount = format_currency(line.amount, currency);
        let (earning, deduction) = match line.kind {
            ComponentKind::Earning => (amount, String::new()),
            ComponentKind::Deduction => (String::new(), amount),
        };
        table.add_row(vec![Cell::new(&line.name), right(earning), right(deduction)]);
    }
    table.add_row(vec![
        heading("Total"),
        right(format_currency(slip.gross_earnings, currency)),
        right(format_currency(slip.total_deductions, currency)),
    ]);

    format!(
        "{}\n{}\nNet Pay: {}",
        slip.structure,
        table,
        format_currency(slip.net_pay, currency)
    )
}

pub fn document_page(page: &Page<DocumentListItem>, currency: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        heading("Number"),
        heading("Date"),
        heading("Party"),
        heading("Net Total"),
        heading("Balance"),
        heading("Status"),
        heading("Id"),
    ]);
    for row in &page.items {
        table.add_row(vec![
            Cell::new(&row.number),
            Cell::new(row.date.get(..10).unwrap_or(&row.date)),
            Cell::new(&row.party_name),
            right(format_currency(row.net_total, currency)),
            right(format_currency(row.balance_due, currency)),
            Cell::new(&row.status),
            Cell::new(&row.id),
        ]);
    }

    let mut footer = format!("Page {}", page.page);
    if let Some(total) = page.total {
        footer.push_str(&format!(" ({total} total)"));
    }
    if page.has_more() {
        footer.push_str(&format!(", next: --page {}", page.page + 1));
    }
    format!("{table}\n{footer}")
}
