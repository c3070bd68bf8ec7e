//! # Payroll
//!
//! Salary structures and the payslips they produce.
//!
//! ## Evaluation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  basic = 20000            (input, always the first earning line)       │
//! │                                                                         │
//! │  hra  = basic * 0.4       → 8000   (can see: basic)                    │
//! │  da   = basic * 0.1       → 2000   (can see: basic, hra)               │
//! │  pf   = (basic + da) * 0.12 → 2640 (can see: basic, hra, da)           │
//! │  tds  = 1500 fixed                                                     │
//! │                                                                         │
//! │  gross = 20000 + 8000 + 2000       = 30000                             │
//! │  deductions = 2640 + 1500          =  4140                             │
//! │  net pay                           = 25860                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A component sees `basic` and every component defined above it, by code.
//! Referencing anything else is rejected when the structure is validated,
//! before any employee is paid.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, FormulaError, ValidationError};
use crate::formula::{Formula, Variables};
use crate::money::Money;

/// Variable name under which the basic salary is visible to formulas.
pub const BASIC_VARIABLE: &str = "basic";

// =============================================================================
// Components
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Earning,
    Deduction,
}

/// How a component amount is derived.
///
/// In TOML: `calculation = { formula = "basic * 0.4" }` or
/// `calculation = { fixed = 150000 }` (minor units).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Calculation {
    Fixed(Money),
    Formula(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalaryComponent {
    /// Short identifier formulas refer to (`hra`, `pf`).
    pub code: String,
    pub name: String,
    pub kind: ComponentKind,
    pub calculation: Calculation,
}

impl SalaryComponent {
    pub fn fixed(code: &str, name: &str, kind: ComponentKind, amount: Money) -> Self {
        SalaryComponent {
            code: code.to_string(),
            name: name.to_string(),
            kind,
            calculation: Calculation::Fixed(amount),
        }
    }

    pub fn formula(code: &str, name: &str, kind: ComponentKind, formula: &str) -> Self {
        SalaryComponent {
            code: code.to_string(),
            name: name.to_string(),
            kind,
            calculation: Calculation::Formula(formula.to_string()),
        }
    }
}

fn validate_code(code: &str) -> Result<(), ValidationError> {
    let mut chars = code.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => {
            return Err(ValidationError::Required {
                field: "component code".to_string(),
            })
        }
    };
    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "component code".to_string(),
            reason: format!("'{code}' must be a letter followed by letters, digits or underscores"),
        });
    }
    if code.eq_ignore_ascii_case(BASIC_VARIABLE) {
        return Err(ValidationError::InvalidFormat {
            field: "component code".to_string(),
            reason: format!("'{BASIC_VARIABLE}' is reserved for the basic salary"),
        });
    }
    Ok(())
}

// =============================================================================
// Salary Structure
// =============================================================================

/// An ordered list of components applied on top of a basic salary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStructure {
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub components: Vec<SalaryComponent>,
}

enum Compiled {
    Fixed(Money),
    Formula(Formula),
}

impl SalaryStructure {
    pub fn new(name: impl Into<String>) -> Self {
        SalaryStructure {
            id: None,
            name: name.into(),
            components: Vec::new(),
        }
    }

    pub fn with_component(mut self, component: SalaryComponent) -> Self {
        self.components.push(component);
        self
    }

    /// Checks codes and parses every formula without computing anything.
    ///
    /// ## Errors
    /// - `Validation` for a missing, malformed or reserved code
    /// - `DuplicateComponent` when two components share a code
    /// - `ComponentFormula` for a syntax error or a reference to a code
    ///   that is not defined above the component
    pub fn validate(&self) -> CoreResult<()> {
        self.compile().map(|_| ())
    }

    fn compile(&self) -> CoreResult<Vec<Compiled>> {
        let mut known: HashSet<String> = HashSet::from([BASIC_VARIABLE.to_string()]);
        let mut compiled = Vec::with_capacity(self.components.len());

        for component in &self.components {
            validate_code(&component.code)?;
            let code = component.code.to_ascii_lowercase();

            let step = match &component.calculation {
                Calculation::Fixed(amount) => Compiled::Fixed(*amount),
                Calculation::Formula(text) => {
                    let wrap = |source: FormulaError| CoreError::ComponentFormula {
                        component: component.code.clone(),
                        source,
                    };
                    let formula = Formula::parse(text).map_err(wrap)?;
                    if let Some(unknown) = formula.variables().into_iter().find(|v| !known.contains(v)) {
                        return Err(wrap(FormulaError::UnknownVariable(unknown)));
                    }
                    Compiled::Formula(formula)
                }
            };

            if !known.insert(code) {
                return Err(CoreError::DuplicateComponent(component.code.clone()));
            }
            compiled.push(step);
        }

        Ok(compiled)
    }

    /// Computes a payslip for one basic salary.
    ///
    /// Formula results round to the cent; a negative component amount is
    /// paid as zero.
    pub fn compute(&self, basic: Money) -> CoreResult<Payslip> {
        if basic.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: "basic salary".to_string(),
            }
            .into());
        }

        let compiled = self.compile()?;
        let mut vars = Variables::new();
        vars.set_money(BASIC_VARIABLE, basic);

        let mut lines = Vec::with_capacity(self.components.len() + 1);
        lines.push(PayslipLine {
            code: BASIC_VARIABLE.to_string(),
            name: "Basic".to_string(),
            kind: ComponentKind::Earning,
            amount: basic,
        });

        for (component, step) in self.components.iter().zip(compiled) {
            let amount = match step {
                Compiled::Fixed(amount) => amount,
                Compiled::Formula(formula) => {
                    formula
                        .evaluate_money(&vars)
                        .map_err(|source| CoreError::ComponentFormula {
                            component: component.code.clone(),
                            source,
                        })?
                }
            }
            .non_negative();

            vars.set_money(&component.code, amount);
            lines.push(PayslipLine {
                code: component.code.clone(),
                name: component.name.clone(),
                kind: component.kind,
                amount,
            });
        }

        let payslip = Payslip::from_lines(self.name.clone(), basic, lines);
        debug!(
            structure = %self.name,
            basic = basic.cents(),
            net_pay = payslip.net_pay.cents(),
            "Payslip computed"
        );
        Ok(payslip)
    }
}

// =============================================================================
// Payslip
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PayslipLine {
    pub code: String,
    pub name: String,
    pub kind: ComponentKind,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub structure: String,
    pub basic: Money,
    pub lines: Vec<PayslipLine>,
    pub gross_earnings: Money,
    pub total_deductions: Money,
    pub net_pay: Money,
}

impl Payslip {
    fn from_lines(structure: String, basic: Money, lines: Vec<PayslipLine>) -> Self {
        let total = |kind: ComponentKind| -> Money {
            lines
                .iter()
                .filter(|l| l.kind == kind)
                .map(|l| l.amount)
                .sum()
        };
        let gross_earnings = total(ComponentKind::Earning);
        let total_deductions = total(ComponentKind::Deduction);

        Payslip {
            structure,
            basic,
            gross_earnings,
            total_deductions,
            net_pay: gross_earnings - total_deductions,
            lines,
        }
    }

    pub fn earnings(&self) -> impl Iterator<Item = &PayslipLine> {
        self.lines.iter().filter(|l| l.kind == ComponentKind::Earning)
    }

    pub fn deductions(&self) -> impl Iterator<Item = &PayslipLine> {
        self.lines.iter().filter(|l| l.kind == ComponentKind::Deduction)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
