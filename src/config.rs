//! Configuration management for Circula server

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Circulation policy knobs applied by the approval gateway
#[derive(Debug, Deserialize, Clone)]
pub struct CirculationConfig {
    /// Loan duration used when the approving librarian does not specify one
    pub loan_period_days: i64,
    /// Fine accrued per overdue day
    pub daily_fine_rate: Decimal,
    /// Days past the due date before fines start accruing
    pub grace_period_days: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub circulation: CirculationConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix CIRCULA_); `__` nests
            // sections so multi-word keys like loan_period_days stay intact
            .add_source(
                Environment::with_prefix("CIRCULA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            loan_period_days: 21,
            daily_fine_rate: Decimal::new(50, 2),
            grace_period_days: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_override_nested_policy_knobs() {
        env::set_var("CIRCULA_CIRCULATION__LOAN_PERIOD_DAYS", "14");
        env::set_var("CIRCULA_SERVER__PORT", "9090");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.circulation.loan_period_days, 14);
        assert_eq!(config.server.port, 9090);

        env::remove_var("CIRCULA_CIRCULATION__LOAN_PERIOD_DAYS");
        env::remove_var("CIRCULA_SERVER__PORT");
    }
}
