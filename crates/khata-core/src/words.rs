//! # Amount in Words
//!
//! English words on the Indian scale, as printed under invoice totals.
//!
//! ```text
//! 12,34,56,789  →  Twelve Crore Thirty Four Lakh Fifty Six Thousand
//!                  Seven Hundred Eighty Nine
//! ```
//!
//! Crore counts above ninety-nine are spelled recursively
//! (`1,00,00,00,000` is "One Hundred Crore"). No "and", title case.

use crate::money::Money;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;

fn push_below_hundred(n: u64, words: &mut Vec<&'static str>) {
    let n = n as usize;
    if n < 20 {
        if n > 0 {
            words.push(ONES[n]);
        }
    } else {
        words.push(TENS[n / 10]);
        if n % 10 > 0 {
            words.push(ONES[n % 10]);
        }
    }
}

fn push_words(n: u64, words: &mut Vec<&'static str>) {
    let crore = n / CRORE;
    if crore > 0 {
        push_words(crore, words);
        words.push("Crore");
    }

    let rest = n % CRORE;
    let scales = [
        (rest / LAKH, Some("Lakh")),
        ((rest / 1000) % 100, Some("Thousand")),
        ((rest / 100) % 10, Some("Hundred")),
        (rest % 100, None),
    ];
    for (count, scale) in scales {
        if count == 0 {
            continue;
        }
        push_below_hundred(count, words);
        if let Some(scale) = scale {
            words.push(scale);
        }
    }
}

/// Spells a whole number.
///
/// ```rust
/// use khata_core::words::number_to_words;
///
/// assert_eq!(number_to_words(0), "Zero");
/// assert_eq!(number_to_words(100_000), "One Lakh");
/// assert_eq!(number_to_words(2_50_075), "Two Lakh Fifty Thousand Seventy Five");
/// ```
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    let mut words = Vec::new();
    push_words(n, &mut words);
    words.join(" ")
}

/// Amount in words with a currency suffix.
///
/// Only whole major units are spelled; paise are dropped and negative
/// amounts read as zero.
///
/// ```rust
/// use khata_core::money::Money;
/// use khata_core::words::amount_in_words;
///
/// assert_eq!(
///     amount_in_words(Money::from_cents(10_599), "Rupees Only"),
///     "One Hundred Five Rupees Only"
/// );
/// ```
pub fn amount_in_words(amount: Money, suffix: &str) -> String {
    let words = number_to_words(amount.floor_major());
    match suffix.trim() {
        "" => words,
        suffix => format!("{words} {suffix}"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
