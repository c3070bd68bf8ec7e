//! # Printable Summary
//!
//! Display strings for the print view of a document: formatted line
//! amounts, totals, tax summary and the amount in words. Everything here
//! is already a string so the renderer (HTML template, terminal table)
//! does no arithmetic.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::currency::{format_amount, format_currency, words_suffix};
use crate::document::Document;
use crate::totals::DocumentTotals;
use crate::words::amount_in_words;

/// Date format on printed documents.
pub const PRINT_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    /// 1-based row number.
    pub index: usize,
    pub description: String,
    pub quantity: String,
    pub rate: String,
    pub discount: String,
    pub tax_rate: String,
    pub tax_amount: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTaxBand {
    pub rate: String,
    pub taxable: String,
    pub tax: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub title: String,
    pub number: String,
    pub date: String,
    pub due_date: Option<String>,
    pub party_name: String,
    pub currency: String,
    pub lines: Vec<SummaryLine>,
    pub tax_bands: Vec<SummaryTaxBand>,
    pub sub_total: String,
    pub total_discount: String,
    pub total_tax: String,
    pub other_charges: String,
    pub net_total: String,
    pub amount_paid: String,
    pub balance_due: String,
    pub status: String,
    pub amount_in_words: String,
    pub notes: Option<String>,
}

impl DocumentSummary {
    /// Builds the summary with the currency's own words suffix.
    pub fn build(document: &Document, totals: &DocumentTotals) -> Self {
        Self::build_with_suffix(document, totals, &words_suffix(&document.currency))
    }

    /// Builds the summary with an explicit words suffix (`"Rupees Only"`).
    pub fn build_with_suffix(document: &Document, totals: &DocumentTotals, suffix: &str) -> Self {
        let code = document.currency.as_str();
        let money = |amount| format_currency(amount, code);

        let lines = document
            .lines
            .iter()
            .zip(&totals.lines)
            .enumerate()
            .map(|(i, (item, line))| SummaryLine {
                index: i + 1,
                description: item.description.clone(),
                quantity: line.effective_quantity.to_string(),
                rate: format_amount(item.rate, code),
                discount: format_amount(line.discount, code),
                tax_rate: line.tax_rate.to_string(),
                tax_amount: format_amount(line.tax_amount, code),
                amount: format_amount(line.amount, code),
            })
            .collect();

        let tax_bands = totals
            .tax_bands()
            .into_iter()
            .map(|band| SummaryTaxBand {
                rate: band.rate.to_string(),
                taxable: format_amount(band.taxable, code),
                tax: format_amount(band.tax, code),
            })
            .collect();

        DocumentSummary {
            title: document.kind.title().to_string(),
            number: document.number.clone(),
            date: document.date.format(PRINT_DATE_FORMAT).to_string(),
            due_date: document
                .due_date
                .map(|d| d.format(PRINT_DATE_FORMAT).to_string()),
            party_name: document.party_name.clone(),
            currency: code.to_string(),
            lines,
            tax_bands,
            sub_total: money(totals.sub_total),
            total_discount: money(totals.total_discount),
            total_tax: money(totals.total_tax),
            other_charges: money(totals.other_charges),
            net_total: money(totals.net_total),
            amount_paid: money(totals.amount_paid),
            balance_due: money(totals.balance_due),
            status: totals.payment_status().to_string(),
            amount_in_words: amount_in_words(totals.net_total, suffix),
            notes: document.notes.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
