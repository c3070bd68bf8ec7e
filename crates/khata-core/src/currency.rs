//! # Currency Formatting
//!
//! Symbol, digit grouping and two fraction digits for printed documents.
//!
//! ## Grouping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Indian  (INR, NPR, PKR, BDT)    ₹1,23,45,678.90                       │
//! │           last three digits, then pairs                                │
//! │                                                                         │
//! │  Western (everything else)       $12,345,678.90                        │
//! │           groups of three                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Grouping follows the currency, not the machine locale, so a rupee
//! invoice prints the same everywhere.

use crate::money::Money;

/// Digit grouping style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Indian,
    Western,
}

/// Display data for one supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub grouping: Grouping,
    /// Appended to the amount in words (`"Rupees Only"`).
    pub words_suffix: &'static str,
}

const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "INR", symbol: "₹", grouping: Grouping::Indian, words_suffix: "Rupees Only" },
    CurrencyInfo { code: "NPR", symbol: "Rs ", grouping: Grouping::Indian, words_suffix: "Nepalese Rupees Only" },
    CurrencyInfo { code: "PKR", symbol: "Rs ", grouping: Grouping::Indian, words_suffix: "Pakistani Rupees Only" },
    CurrencyInfo { code: "BDT", symbol: "৳", grouping: Grouping::Indian, words_suffix: "Taka Only" },
    CurrencyInfo { code: "LKR", symbol: "Rs ", grouping: Grouping::Western, words_suffix: "Sri Lankan Rupees Only" },
    CurrencyInfo { code: "USD", symbol: "$", grouping: Grouping::Western, words_suffix: "Dollars Only" },
    CurrencyInfo { code: "EUR", symbol: "€", grouping: Grouping::Western, words_suffix: "Euros Only" },
    CurrencyInfo { code: "GBP", symbol: "£", grouping: Grouping::Western, words_suffix: "Pounds Only" },
    CurrencyInfo { code: "AED", symbol: "AED ", grouping: Grouping::Western, words_suffix: "Dirhams Only" },
    CurrencyInfo { code: "SGD", symbol: "S$", grouping: Grouping::Western, words_suffix: "Singapore Dollars Only" },
];

/// Looks up a currency by ISO code, case-insensitively.
pub fn currency(code: &str) -> Option<&'static CurrencyInfo> {
    let code = code.trim();
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

pub fn grouping_for(code: &str) -> Grouping {
    currency(code).map_or(Grouping::Western, |c| c.grouping)
}

/// Currency symbol; unknown codes print as the upper-cased code and a space.
pub fn symbol_for(code: &str) -> String {
    match currency(code) {
        Some(info) => info.symbol.to_string(),
        None => format!("{} ", code.trim().to_ascii_uppercase()),
    }
}

/// Suffix for the amount-in-words line.
pub fn words_suffix(code: &str) -> String {
    match currency(code) {
        Some(info) => info.words_suffix.to_string(),
        None => format!("{} Only", code.trim().to_ascii_uppercase()),
    }
}

/// Inserts separators into a run of ASCII digits.
///
/// ```rust
/// use khata_core::currency::{group_digits, Grouping};
///
/// assert_eq!(group_digits("12345678", Grouping::Indian), "1,23,45,678");
/// assert_eq!(group_digits("12345678", Grouping::Western), "12,345,678");
/// ```
pub fn group_digits(digits: &str, grouping: Grouping) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let step = match grouping {
        Grouping::Indian => 2,
        Grouping::Western => 3,
    };

    let mut groups = Vec::with_capacity(head.len() / step + 2);
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(step);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

fn grouped_abs(amount: Money, grouping: Grouping) -> String {
    let cents = amount.cents().unsigned_abs();
    format!(
        "{}.{:02}",
        group_digits(&(cents / 100).to_string(), grouping),
        cents % 100
    )
}

/// Grouped number with two decimals and no symbol, for table cells.
///
/// ```rust
/// use khata_core::currency::format_amount;
/// use khata_core::money::Money;
///
/// assert_eq!(format_amount(Money::from_cents(123_456_789), "INR"), "12,34,567.89");
/// ```
pub fn format_amount(amount: Money, code: &str) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    format!("{sign}{}", grouped_abs(amount, grouping_for(code)))
}

/// Symbol, grouped number and two decimals.
///
/// ```rust
/// use khata_core::currency::format_currency;
/// use khata_core::money::Money;
///
/// assert_eq!(format_currency(Money::from_cents(1_234_567_890), "INR"), "₹1,23,45,678.90");
/// assert_eq!(format_currency(Money::from_cents(-550), "USD"), "-$5.50");
/// ```
pub fn format_currency(amount: Money, code: &str) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    format!(
        "{sign}{}{}",
        symbol_for(code),
        grouped_abs(amount, grouping_for(code))
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
