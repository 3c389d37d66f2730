use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::DeskError;
use crate::utils::{get_env_with_prefix, parse_env};

/// Main configuration for a ledgerdesk deployment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub payment_config: PaymentConfigSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Defaults applied to table views.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableConfig {
    /// Page size used when a request does not specify one.
    #[serde(default = "default_rows_per_page")]
    pub default_rows_per_page: usize,
    /// Upper bound accepted for a requested page size.
    #[serde(default = "default_max_rows_per_page")]
    pub max_rows_per_page: usize,
}

/// CSV export settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Artificial delay before an export is produced, in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
}

/// Behaviour of the simulated payment-configuration backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfigSettings {
    /// Latency added to every call, in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Probability (0.0 to 1.0) that a call fails with a simulated network error.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_rows_per_page: default_rows_per_page(),
            max_rows_per_page: default_max_rows_per_page(),
        }
    }
}

impl Default for PaymentConfigSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            failure_rate: default_failure_rate(),
        }
    }
}

impl PaymentConfigSettings {
    /// Settings with no latency and no simulated failures.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rows_per_page() -> usize {
    10
}

fn default_max_rows_per_page() -> usize {
    100
}

fn default_latency_ms() -> u64 {
    500
}

fn default_failure_rate() -> f64 {
    0.05
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_rows_per_page(mut self, rows: usize) -> Self {
        self.config.table.default_rows_per_page = rows;
        self
    }

    pub fn with_export_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.export.delay_ms = delay_ms;
        self
    }

    pub fn with_payment_config(mut self, settings: PaymentConfigSettings) -> Self {
        self.config.payment_config = settings;
        self
    }

    /// Load configuration from environment variables with LEDGERDESK_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = parse_env("PORT") {
            self.config.server.port = port;
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        if let Some(rows) = parse_env("ROWS_PER_PAGE") {
            self.config.table.default_rows_per_page = rows;
        }
        if let Some(max_rows) = parse_env("MAX_ROWS_PER_PAGE") {
            self.config.table.max_rows_per_page = max_rows;
        }
        if let Some(delay) = parse_env("EXPORT_DELAY_MS") {
            self.config.export.delay_ms = delay;
        }
        if let Some(latency) = parse_env("PAYMENT_CONFIG_LATENCY_MS") {
            self.config.payment_config.latency_ms = latency;
        }
        if let Some(rate) = parse_env("PAYMENT_CONFIG_FAILURE_RATE") {
            self.config.payment_config.failure_rate = rate;
        }
        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns `DeskError::BadRequest` for an unparsable address, an unknown
    /// log level, page sizes outside 1..=max or a failure rate outside 0..=1.
    pub fn build(self) -> crate::error::Result<Config> {
        self.config.server.addr().map_err(|e| {
            DeskError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;

        if self.config.server.port == 0 {
            return Err(DeskError::bad_request("Server port must be greater than 0"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(DeskError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let table = &self.config.table;
        if table.max_rows_per_page == 0 || table.max_rows_per_page > 1000 {
            return Err(DeskError::bad_request(
                "Maximum rows per page must be between 1 and 1000",
            ));
        }
        if table.default_rows_per_page == 0 || table.default_rows_per_page > table.max_rows_per_page {
            return Err(DeskError::bad_request(format!(
                "Default rows per page must be between 1 and {}",
                table.max_rows_per_page
            )));
        }

        let rate = self.config.payment_config.failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(DeskError::bad_request(format!(
                "Payment config failure rate must be between 0 and 1, got {}",
                rate
            )));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.table.default_rows_per_page, 10);
        assert_eq!(config.payment_config.failure_rate, 0.05);
        assert_eq!(config.export.delay_ms, 0);
    }

    #[test]
    fn test_rejects_invalid_address() {
        let result = ConfigBuilder::new().with_host("invalid..host").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_log_level() {
        let result = ConfigBuilder::new().with_log_level("loud").build();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_rejects_page_size_above_max() {
        let result = ConfigBuilder::new().with_rows_per_page(500).build();
        assert!(result.is_err());

        let result = ConfigBuilder::new().with_rows_per_page(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_failure_rate_out_of_range() {
        let result = ConfigBuilder::new()
            .with_payment_config(PaymentConfigSettings {
                latency_ms: 0,
                failure_rate: 1.5,
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_env() {
        unsafe {
            std::env::set_var("LEDGERDESK_ROWS_PER_PAGE", "25");
            std::env::set_var("LEDGERDESK_PAYMENT_CONFIG_FAILURE_RATE", "0");
        }
        let config = ConfigBuilder::new().from_env().build().unwrap();
        assert_eq!(config.table.default_rows_per_page, 25);
        assert_eq!(config.payment_config.failure_rate, 0.0);
        unsafe {
            std::env::remove_var("LEDGERDESK_ROWS_PER_PAGE");
            std::env::remove_var("LEDGERDESK_PAYMENT_CONFIG_FAILURE_RATE");
        }
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config =
            serde_json::from_str(r#"{"server": {"port": 9000}, "export": {"delay_ms": 250}}"#)
                .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.export.delay_ms, 250);
        assert_eq!(config.table.max_rows_per_page, 100);
    }
}
