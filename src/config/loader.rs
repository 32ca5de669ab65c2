//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tokens: TokensSection,
    pub stream: StreamSection,
    pub swap: SwapSection,
    pub rug_check: RugCheckSection,
    pub sell: SellSection,
    pub jupiter: JupiterSection,
    pub helius: HeliusSection,
    pub store: StoreSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub alerts: AlertsSection,
}

/// Tokens configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct TokensSection {
    /// WSOL mint address, the base currency for every swap
    pub wsol_mint: String,
    /// AMM program id whose logs are watched for pool creation
    pub program_id: String,
}

/// Log stream configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSection {
    /// WebSocket endpoint for log subscriptions
    pub ws_url: String,
    /// Fixed delay before reconnecting after a dropped connection
    pub reconnect_delay_ms: u64,
}

impl StreamSection {
    /// Get the WebSocket URL with environment variable override.
    /// Checks HELIUS_WSS_URI env var first, falls back to config value.
    pub fn get_ws_url(&self) -> String {
        std::env::var("HELIUS_WSS_URI").unwrap_or_else(|_| self.ws_url.clone())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Swap configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SwapSection {
    /// Amount of SOL spent per buy, in lamports
    pub amount_lamports: u64,
    /// Wait between risk approval and committing capital
    pub pre_quote_delay_ms: u64,
    /// Per-request HTTP timeout
    pub request_timeout_ms: u64,
    /// Maximum concurrently running acquisition pipelines
    pub max_concurrent: usize,
    /// Base delay for the doubling price-retry backoff
    pub price_retry_base_delay_ms: u64,
}

impl SwapSection {
    pub fn pre_quote_delay(&self) -> Duration {
        Duration::from_millis(self.pre_quote_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn price_retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.price_retry_base_delay_ms)
    }
}

/// Rug check configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct RugCheckSection {
    /// Rug check report API base URL
    pub api_url: String,
    /// Skip tokens whose mint ends with this suffix (case-insensitive)
    #[serde(default)]
    pub ignore_suffix: String,
    /// Log every received stream frame at debug level
    #[serde(default)]
    pub verbose_log: bool,
    /// Simulate swaps instead of executing them
    #[serde(default)]
    pub simulation_mode: bool,
}

/// Sell / exit configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SellSection {
    /// Evaluate thresholds and liquidate automatically
    pub auto_sell: bool,
    /// Take-profit threshold, percent of cost basis
    pub take_profit_percent: f64,
    /// Stop-loss threshold, percent of cost basis (positive number)
    pub stop_loss_percent: f64,
    /// Interval between tracker evaluation cycles
    pub poll_interval_ms: u64,
    /// Public wallet address to append a tracking link for, if set
    #[serde(default)]
    pub track_public_wallet: String,
}

impl SellSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Jupiter API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct JupiterSection {
    /// Price API base URL
    pub price_api_url: String,
    /// Quote API base URL
    pub quote_api_url: String,
    /// Swap execution API base URL
    pub swap_api_url: String,
}

/// Helius transaction API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct HeliusSection {
    /// Enhanced transactions API base URL
    pub api_url: String,
}

impl HeliusSection {
    /// Get the API URL with environment variable override.
    /// Checks HELIUS_HTTPS_URI_TX env var first, falls back to config value.
    pub fn get_api_url(&self) -> String {
        std::env::var("HELIUS_HTTPS_URI_TX").unwrap_or_else(|_| self.api_url.clone())
    }
}

/// Holding store configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Path of the JSON holdings file
    pub path: String,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

/// Alerts configuration section (optional)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertsSection {
    /// Enable Discord webhook notifications
    #[serde(default)]
    pub discord_enabled: bool,
    /// Discord webhook URL
    #[serde(default)]
    pub discord_webhook_url: String,
}

impl AlertsSection {
    /// Get the webhook URL with environment variable override.
    /// Checks DISCORD_WEBHOOK_URL env var first, falls back to config value.
    pub fn get_webhook_url(&self) -> String {
        std::env::var("DISCORD_WEBHOOK_URL").unwrap_or_else(|_| self.discord_webhook_url.clone())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.wsol_mint.is_empty() {
            return Err(ConfigError::ValidationError(
                "wsol_mint cannot be empty".to_string(),
            ));
        }

        if self.tokens.program_id.is_empty() {
            return Err(ConfigError::ValidationError(
                "program_id cannot be empty".to_string(),
            ));
        }

        if self.stream.ws_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "ws_url cannot be empty".to_string(),
            ));
        }

        if self.swap.amount_lamports == 0 {
            return Err(ConfigError::ValidationError(
                "amount_lamports must be > 0".to_string(),
            ));
        }

        if self.swap.max_concurrent == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent must be > 0".to_string(),
            ));
        }

        if self.swap.price_retry_base_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "price_retry_base_delay_ms must be > 0".to_string(),
            ));
        }

        if self.sell.take_profit_percent <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "take_profit_percent must be > 0, got {}",
                self.sell.take_profit_percent
            )));
        }

        if self.sell.stop_loss_percent <= 0.0 || self.sell.stop_loss_percent > 100.0 {
            return Err(ConfigError::ValidationError(format!(
                "stop_loss_percent must be 0-100, got {}",
                self.sell.stop_loss_percent
            )));
        }

        if self.sell.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }

        if self.rug_check.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rug_check api_url cannot be empty".to_string(),
            ));
        }

        if self.jupiter.price_api_url.is_empty()
            || self.jupiter.quote_api_url.is_empty()
            || self.jupiter.swap_api_url.is_empty()
        {
            return Err(ConfigError::ValidationError(
                "jupiter URLs cannot be empty".to_string(),
            ));
        }

        if self.helius.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "helius api_url cannot be empty".to_string(),
            ));
        }

        if self.store.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "store path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
