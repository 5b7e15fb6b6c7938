//! Application configuration management.
//!
//! Ledger behaviour is driven by an explicit [`LedgerSettings`] value that is
//! passed into the engines; nothing in the workspace reads settings from a
//! global.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger engine settings.
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Settings consumed by the posting, reconciliation and aging engines.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// VAT rate in percent applied when a document line carries none.
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: Decimal,
    /// Largest absolute variance still considered reconciled.
    #[serde(default = "default_reconciliation_tolerance")]
    pub reconciliation_tolerance: Decimal,
    /// Expected-credit-loss rates per aging bucket.
    #[serde(default)]
    pub ecl_rates: EclRates,
    /// Account code overrides keyed by account role (e.g. `sales_revenue`).
    #[serde(default)]
    pub account_codes: HashMap<String, String>,
}

fn default_vat_rate() -> Decimal {
    Decimal::from(14)
}

fn default_reconciliation_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            default_vat_rate: default_vat_rate(),
            reconciliation_tolerance: default_reconciliation_tolerance(),
            ecl_rates: EclRates::default(),
            account_codes: HashMap::new(),
        }
    }
}

impl LedgerSettings {
    /// Returns the configured account code for a role key, if overridden.
    #[must_use]
    pub fn account_code_override(&self, role_key: &str) -> Option<&str> {
        self.account_codes.get(role_key).map(String::as_str)
    }
}

/// Expected-credit-loss rates, expressed as fractions (0.02 = 2%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EclRates {
    /// 0-30 days.
    pub current: Decimal,
    /// 31-60 days.
    pub days_31_60: Decimal,
    /// 61-90 days.
    pub days_61_90: Decimal,
    /// 91-120 days.
    pub days_91_120: Decimal,
    /// More than 120 days.
    pub over_120: Decimal,
}

impl Default for EclRates {
    fn default() -> Self {
        Self {
            current: Decimal::new(5, 3),
            days_31_60: Decimal::new(2, 2),
            days_61_90: Decimal::new(5, 2),
            days_91_120: Decimal::new(15, 2),
            over_120: Decimal::new(50, 2),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tijara=info,sea_orm=warn,sqlx=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// then `TIJARA__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TIJARA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
