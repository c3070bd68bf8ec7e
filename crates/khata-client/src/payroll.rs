//! # Payroll Service
//!
//! Salary structures come from the backend with fixed amounts in major
//! units and formulas as plain text. They are validated as soon as they
//! arrive so a broken formula fails on load, not on the first payslip.

use khata_core::coerce::{self, AliasGroup};
use khata_core::payroll::{Calculation, ComponentKind, SalaryComponent};
use khata_core::{Money, Payslip, SalaryStructure};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::context::RequestContext;
use crate::error::ClientResult;
use crate::wire::unwrap_record;

/// REST collection for salary structures.
pub const STRUCTURES_ENDPOINT: &str = "payroll/salary-structures";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentRow {
    #[serde(default, deserialize_with = "coerce::text")]
    code: String,
    #[serde(default, deserialize_with = "coerce::text")]
    name: String,
    #[serde(default, deserialize_with = "coerce::text")]
    kind: String,
    #[serde(default, deserialize_with = "coerce::text")]
    formula: String,
    #[serde(default, deserialize_with = "coerce::money")]
    amount: Money,
}

impl ComponentRow {
    const ALIASES: &'static [AliasGroup] = &[
        &["code", "abbr", "abbreviation"],
        &["name", "componentName"],
        &["kind", "type", "componentType"],
        &["amount", "value", "fixedAmount"],
    ];

    fn from_value(value: Value) -> Self {
        serde_json::from_value(coerce::resolve_aliases(value, Self::ALIASES)).unwrap_or_default()
    }
}

impl From<ComponentRow> for SalaryComponent {
    fn from(row: ComponentRow) -> Self {
        let kind = match row.kind.trim().to_ascii_lowercase().as_str() {
            "deduction" | "deductions" => ComponentKind::Deduction,
            _ => ComponentKind::Earning,
        };
        let calculation = match row.formula.trim() {
            "" => Calculation::Fixed(row.amount),
            text => Calculation::Formula(text.to_string()),
        };
        let code = row.code.trim().to_string();
        let name = match row.name.trim() {
            "" => code.clone(),
            name => name.to_string(),
        };

        SalaryComponent {
            code,
            name,
            kind,
            calculation,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructureRow {
    #[serde(default, deserialize_with = "coerce::text")]
    id: String,
    #[serde(default, deserialize_with = "coerce::text")]
    name: String,
    #[serde(default, deserialize_with = "component_rows")]
    components: Vec<Value>,
}

impl StructureRow {
    const ALIASES: &'static [AliasGroup] = &[
        &["id", "_id"],
        &["name", "structureName"],
        &["components", "salaryComponents"],
    ];
}

fn component_rows<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(rows) => rows,
        _ => Vec::new(),
    })
}

/// Reads a salary structure from a backend record.
pub fn structure_from_value(value: Value) -> SalaryStructure {
    let value = coerce::resolve_aliases(unwrap_record(value), StructureRow::ALIASES);
    let row: StructureRow = serde_json::from_value(value).unwrap_or_default();
    SalaryStructure {
        id: Uuid::parse_str(row.id.trim()).ok(),
        name: row.name.trim().to_string(),
        components: row
            .components
            .into_iter()
            .map(|c| ComponentRow::from_value(c).into())
            .collect(),
    }
}

#[derive(Debug, Clone)]
pub struct PayrollService {
    api: ApiClient,
}

impl PayrollService {
    pub fn new(api: ApiClient) -> Self {
        PayrollService { api }
    }

    /// Loads and validates one salary structure.
    #[instrument(skip(self, ctx), fields(tenant = ctx.tenant_id()))]
    pub async fn fetch_structure(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> ClientResult<SalaryStructure> {
        let path = format!("{STRUCTURES_ENDPOINT}/{id}");
        let value: Value = self.api.get(ctx, &path, &[]).await?;

        let mut structure = structure_from_value(value);
        structure.id = Some(id);
        structure.validate()?;

        debug!(components = structure.components.len(), "Loaded salary structure");
        Ok(structure)
    }

    /// Fetches a structure and computes a payslip for `basic`.
    pub async fn payslip(
        &self,
        ctx: &RequestContext,
        structure_id: Uuid,
        basic: Money,
    ) -> ClientResult<Payslip> {
        let structure = self.fetch_structure(ctx, structure_id).await?;
        Ok(structure.compute(basic)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structure_from_backend_record() {
        let structure = structure_from_value(json!({
            "data": {
                "_id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
                "name": "Staff",
                "components": [
                    { "abbr": "HRA", "name": "House Rent", "type": "earning", "formula": "basic * 0.4" },
                    { "code": "conv", "type": "Earning", "value": "1600" },
                    { "code": "pf", "name": "Provident Fund", "type": "deduction", "formula": "basic * 12 / 100" }
                ]
            }
        }));

        assert!(structure.id.is_some());
        assert_eq!(structure.name, "Staff");
        assert_eq!(structure.components.len(), 3);
        assert_eq!(structure.components[1].name, "conv");
        assert_eq!(
            structure.components[1].calculation,
            Calculation::Fixed(Money::from_major(1_600))
        );
        assert_eq!(structure.components[2].kind, ComponentKind::Deduction);

        let slip = structure.compute(Money::from_major(20_000)).unwrap();
        assert_eq!(slip.gross_earnings, Money::from_major(29_600));
        assert_eq!(slip.total_deductions, Money::from_major(2_400));
        assert_eq!(slip.net_pay, Money::from_major(27_200));
    }

    #[test]
    fn test_structure_with_unknown_reference_fails_validation() {
        let structure = structure_from_value(json!({
            "name": "Broken",
            "components": [{ "code": "hra", "formula": "da * 2" }]
        }));
        assert!(structure.validate().is_err());
    }

    #[test]
    fn test_structure_with_both_names_for_fields() {
        let structure = structure_from_value(json!({
            "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "_id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "name": "Staff",
            "structureName": "Staff",
            "components": [
                { "code": "hra", "abbr": "HRA", "type": "earning", "kind": "", "formula": "basic * 0.5" },
                { "code": "pf", "type": "deduction", "value": 1800, "amount": null }
            ]
        }));

        assert!(structure.id.is_some());
        assert_eq!(structure.name, "Staff");
        assert_eq!(structure.components.len(), 2);
        assert_eq!(structure.components[0].code, "hra");
        assert_eq!(
            structure.components[1].calculation,
            Calculation::Fixed(Money::from_major(1_800))
        );
        assert_eq!(structure.components[1].kind, ComponentKind::Deduction);
    }
}
