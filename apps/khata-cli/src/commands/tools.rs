//! `words` and `eval`.

use anyhow::{anyhow, bail, Context, Result};
use khata_core::{amount_in_words, Formula, Money, Variables};

use crate::config::CliConfig;

pub fn words(
    config: &CliConfig,
    amount: &str,
    suffix: Option<String>,
    currency: Option<String>,
) -> Result<()> {
    let money = Money::parse_major(amount).ok_or_else(|| anyhow!("'{amount}' is not an amount"))?;
    let currency = currency
        .map(|c| c.trim().to_ascii_uppercase())
        .unwrap_or_else(|| config.currency.clone());
    let suffix = suffix.unwrap_or_else(|| config.suffix_for(&currency));

    println!("{}", amount_in_words(money, &suffix));
    Ok(())
}

/// Parses `name=value` bindings.
pub fn parse_bindings(bindings: &[String]) -> Result<Variables> {
    let mut vars = Variables::new();
    for binding in bindings {
        let (name, value) = binding
            .split_once('=')
            .ok_or_else(|| anyhow!("'{binding}' is not NAME=VALUE"))?;
        let name = name.trim();
        if name.is_empty() {
            bail!("'{binding}' has no variable name");
        }
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("'{}' is not a number", value.trim()))?;
        vars.set(name, value);
    }
    Ok(vars)
}

pub fn eval(expr: &str, bindings: &[String]) -> Result<()> {
    let formula = Formula::parse(expr)?;
    let vars = parse_bindings(bindings)?;

    let missing: Vec<String> = formula
        .variables()
        .into_iter()
        .filter(|v| !vars.contains(v))
        .collect();
    if !missing.is_empty() {
        bail!("unbound variables: {} (pass --var name=value)", missing.join(", "));
    }

    println!("{}", formula.evaluate(&vars)?);
    Ok(())
}
