//! # CLI Configuration
//!
//! `khata.toml` in the platform config directory, then `KHATA_*`
//! environment variables, then validation.
//!
//! ## Configuration File Format
//! ```toml
//! currency = "INR"
//! words_suffix = "Rupees Only"   # optional, defaults per currency
//!
//! [default_tax]                  # percent, used when a line has no rate
//! sales_invoice = 18
//! purchase_bill = 18
//! debit_note = 0
//! purchase_order = 0
//!
//! [api]
//! base_url = "https://erp.example.com/api/"
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};

use khata_client::ClientConfig;
use khata_core::currency::words_suffix;
use khata_core::validation::{validate_currency_code, validate_tax_rate};
use khata_core::{DocumentKind, TaxRate, TotalsCalculator, ValidationError, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Invalid API configuration: {0}")]
    Api(#[from] khata_client::ClientError),
}

/// Percent rates applied to lines that carry none, per document kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTaxRates {
    pub sales_invoice: f64,
    pub purchase_bill: f64,
    pub debit_note: f64,
    pub purchase_order: f64,
}

impl DefaultTaxRates {
    pub fn rate_for(&self, kind: DocumentKind) -> TaxRate {
        let pct = match kind {
            DocumentKind::SalesInvoice => self.sales_invoice,
            DocumentKind::PurchaseBill => self.purchase_bill,
            DocumentKind::DebitNote => self.debit_note,
            DocumentKind::PurchaseOrder => self.purchase_order,
        };
        TaxRate::from_percentage(pct)
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Overrides the currency's own words suffix.
    #[serde(default)]
    pub words_suffix: Option<String>,

    #[serde(default)]
    pub default_tax: DefaultTaxRates,

    #[serde(default)]
    pub api: ClientConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            currency: default_currency(),
            words_suffix: None,
            default_tax: DefaultTaxRates::default(),
            api: ClientConfig::default(),
        }
    }
}

impl CliConfig {
    /// Defaults, then the file (if present), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading config");
                let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?
            }
            other => {
                debug!(path = ?other, "No config file, using defaults");
                CliConfig::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.api.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(code) = lookup("KHATA_CURRENCY") {
            debug!(currency = %code, "Overriding currency from environment");
            self.currency = code;
        }
        if let Some(suffix) = lookup("KHATA_WORDS_SUFFIX") {
            self.words_suffix = Some(suffix);
        }
        self.currency = self.currency.trim().to_ascii_uppercase();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_currency_code(&self.currency)?;
        for kind in DocumentKind::ALL {
            validate_tax_rate(self.default_tax.rate_for(kind))?;
        }
        self.api.validate()?;
        Ok(())
    }

    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "khata", "erp")
            .map(|dirs| dirs.config_dir().join("khata.toml"))
    }

    pub fn calculator(&self, kind: DocumentKind) -> TotalsCalculator {
        TotalsCalculator::with_default_tax_rate(self.default_tax.rate_for(kind))
    }

    /// Suffix for amounts in words in `currency`.
    pub fn suffix_for(&self, currency: &str) -> String {
        match &self.words_suffix {
            Some(suffix) if currency.eq_ignore_ascii_case(&self.currency) => suffix.clone(),
            _ => words_suffix(currency),
        }
    }
}
