//! # Lenient Numeric Coercion
//!
//! Form payloads are whatever the browser inputs produced: numbers,
//! numeric strings, empty strings, `null`, or missing keys. The forms
//! always treated those as `Number(x) || 0`, and the calculator keeps that
//! contract: nothing here ever fails, unparseable input is zero.
//!
//! ## Usage
//! ```rust
//! use khata_core::coerce;
//! use khata_core::money::Money;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Row {
//!     #[serde(default, deserialize_with = "coerce::money")]
//!     rate: Money,
//! }
//!
//! let row: Row = serde_json::from_str(r#"{ "rate": "12.50" }"#).unwrap();
//! assert_eq!(row.rate.cents(), 1250);
//!
//! let row: Row = serde_json::from_str(r#"{ "rate": "n/a" }"#).unwrap();
//! assert!(row.rate.is_zero());
//! ```

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::money::{parse_fixed, Money};
use crate::types::{Quantity, TaxRate, MAX_TAX_RATE_BPS};

// =============================================================================
// Value → fixed point
// =============================================================================

fn scaled_f64(value: f64, scale: u32) -> Option<i64> {
    let scaled = (value * 10f64.powi(scale as i32)).round();
    scaled.is_finite().then_some(scaled as i64)
}

/// Reads a JSON value as a fixed-point integer with `scale` decimals.
///
/// Numbers go through their decimal text first so `10.1` stays exact;
/// exponent forms (`1e3`) fall back to float conversion.
fn fixed_from_value(value: &Value, scale: u32) -> Option<i64> {
    match value {
        Value::Number(n) => parse_fixed(&n.to_string(), scale)
            .or_else(|| n.as_f64().and_then(|f| scaled_f64(f, scale))),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            parse_fixed(s, scale).or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .and_then(|f| scaled_f64(f, scale))
            })
        }
        _ => None,
    }
}

// =============================================================================
// Public coercions
// =============================================================================

/// Major-unit amount; anything unparseable is zero.
pub fn money_from_value(value: &Value) -> Money {
    fixed_from_value(value, 2)
        .map(Money::from_cents)
        .unwrap_or_default()
}

/// Quantity; anything unparseable is zero.
pub fn quantity_from_value(value: &Value) -> Quantity {
    fixed_from_value(value, 3)
        .map(Quantity::from_thousandths)
        .unwrap_or_default()
}

/// Percentage (`5`, `"18"`, `"8.25"`) as a tax rate.
///
/// `None` when unselected (missing, `null`, empty, non-numeric); numeric
/// values are clamped to 0-100%.
pub fn tax_rate_from_value(value: &Value) -> Option<TaxRate> {
    // a percentage with two decimals is exactly basis points
    fixed_from_value(value, 2).map(|bps| {
        let bps = bps.clamp(0, i64::from(MAX_TAX_RATE_BPS));
        TaxRate::from_bps(bps as u32)
    })
}

/// Checkbox-style flag: `true`, `1`, `"true"`, `"yes"`, `"on"`.
pub fn flag_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    }
}

// =============================================================================
// serde `deserialize_with` adapters
// =============================================================================

/// `deserialize_with` adapter for [`Money`] in major units.
pub fn money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    Ok(money_from_value(&Value::deserialize(deserializer)?))
}

/// `deserialize_with` adapter for [`Quantity`].
pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Quantity, D::Error> {
    Ok(quantity_from_value(&Value::deserialize(deserializer)?))
}

/// `deserialize_with` adapter for an optional [`Quantity`].
///
/// `None` unless the value is numeric.
pub fn optional_quantity<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Quantity>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(fixed_from_value(&value, 3).map(Quantity::from_thousandths))
}

/// `deserialize_with` adapter for an optional tax percentage.
pub fn optional_tax_rate<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TaxRate>, D::Error> {
    Ok(tax_rate_from_value(&Value::deserialize(deserializer)?))
}

/// `deserialize_with` adapter for checkbox flags.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(flag_from_value(&Value::deserialize(deserializer)?))
}

/// `deserialize_with` adapter for free text that may arrive as a number or null.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

// =============================================================================
// Field aliases
// =============================================================================

/// A field name followed by the other names payloads use for it.
pub type AliasGroup = &'static [&'static str];

fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Folds each alias group of a JSON object onto its field name.
///
/// A payload may carry several names for one field (`id` and `_id`,
/// `discount` and `headerDiscount`). The first filled value in group order
/// wins, the other keys are dropped, and the winner is stored under the
/// field name, so a later typed read never sees a duplicate field.
/// Anything that is not an object passes through untouched.
pub fn resolve_aliases(value: Value, groups: &[AliasGroup]) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    for group in groups {
        let Some(field) = group.first() else {
            continue;
        };
        let mut present: Vec<Value> = group.iter().filter_map(|key| map.remove(*key)).collect();
        if present.is_empty() {
            continue;
        }
        let pick = present.iter().position(is_filled).unwrap_or(0);
        map.insert((*field).to_string(), present.swap_remove(pick));
    }
    Value::Object(map)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_money_coercion() {
        assert_eq!(money_from_value(&json!(10)).cents(), 1000);
        assert_eq!(money_from_value(&json!(10.1)).cents(), 1010);
        assert_eq!(money_from_value(&json!("99.99")).cents(), 9999);
        assert_eq!(money_from_value(&json!(" 5 ")).cents(), 500);
        assert_eq!(money_from_value(&json!("1e3")).cents(), 100_000);

        assert!(money_from_value(&json!(null)).is_zero());
        assert!(money_from_value(&json!("")).is_zero());
        assert!(money_from_value(&json!("abc")).is_zero());
        assert!(money_from_value(&json!([1, 2])).is_zero());
        assert!(money_from_value(&json!("NaN")).is_zero());
        assert!(money_from_value(&json!("Infinity")).is_zero());
    }

    #[test]
    fn test_quantity_coercion() {
        assert_eq!(quantity_from_value(&json!(2)).thousandths(), 2000);
        assert_eq!(quantity_from_value(&json!("12.345")).thousandths(), 12_345);
        assert!(quantity_from_value(&json!({})).is_zero());
    }

    #[test]
    fn test_tax_rate_coercion() {
        assert_eq!(tax_rate_from_value(&json!(5)), Some(TaxRate::from_bps(500)));
        assert_eq!(tax_rate_from_value(&json!("8.25")), Some(TaxRate::from_bps(825)));
        assert_eq!(tax_rate_from_value(&json!(-3)), Some(TaxRate::zero()));
        assert_eq!(tax_rate_from_value(&json!(400)), Some(TaxRate::from_bps(10_000)));
        assert_eq!(tax_rate_from_value(&json!("")), None);
        assert_eq!(tax_rate_from_value(&json!(null)), None);
        assert_eq!(tax_rate_from_value(&json!("GST")), None);
    }

    #[test]
    fn test_flag_coercion() {
        assert!(flag_from_value(&json!(true)));
        assert!(flag_from_value(&json!(1)));
        assert!(flag_from_value(&json!("Yes")));
        assert!(!flag_from_value(&json!("false")));
        assert!(!flag_from_value(&json!(0)));
        assert!(!flag_from_value(&json!(null)));
    }

    #[test]
    fn test_resolve_aliases_prefers_first_filled_value() {
        const GROUPS: &[AliasGroup] = &[&["quantity", "qty"], &["headerDiscount", "discount"]];

        let resolved = resolve_aliases(
            json!({ "qty": 2, "quantity": 3, "discount": 10, "headerDiscount": "", "rate": 50 }),
            GROUPS,
        );
        assert_eq!(
            resolved,
            json!({ "quantity": 3, "headerDiscount": 10, "rate": 50 })
        );

        let renamed = resolve_aliases(json!({ "qty": "4" }), GROUPS);
        assert_eq!(renamed, json!({ "quantity": "4" }));

        let blank = resolve_aliases(json!({ "quantity": null, "qty": " " }), GROUPS);
        assert_eq!(blank, json!({ "quantity": null }));

        assert_eq!(resolve_aliases(json!([1, 2]), GROUPS), json!([1, 2]));
    }
}
