//! `payslip`: a salary structure authored as TOML, applied to one basic.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use khata_core::{Money, SalaryStructure};

use crate::config::CliConfig;
use crate::render;

pub fn load_structure(path: &Path) -> Result<SalaryStructure> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let structure: SalaryStructure =
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    structure
        .validate()
        .with_context(|| format!("salary structure '{}'", structure.name))?;
    Ok(structure)
}

pub fn payslip(config: &CliConfig, path: &Path, basic: &str) -> Result<()> {
    let structure = load_structure(path)?;
    let basic = Money::parse_major(basic).ok_or_else(|| anyhow!("'{basic}' is not an amount"))?;

    let slip = structure.compute(basic)?;
    println!("{}", render::payslip(&slip, &config.currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_structure_rejects_forward_reference() {
        let path = std::env::temp_dir().join(format!("khata-structure-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            name = "Broken"

            [[components]]
            code = "hra"
            name = "HRA"
            kind = "earning"
            calculation = { formula = "da * 2" }

            [[components]]
            code = "da"
            name = "DA"
            kind = "earning"
            calculation = { fixed = 100000 }
            "#,
        )
        .unwrap();

        let result = load_structure(&path);
        std::fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("Broken"));
    }
}
