use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ConfigError;

fn default_quote_currency() -> String {
    "USDT".to_string()
}

/// Strategy settings. Immutable once [`StrategyConfig::resolve`] has run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrategyConfig {
    pub symbol: String,
    pub quantity: Decimal,
    /// Quote-currency spread between a buy and its paired sell.
    #[serde(default)]
    pub gap: Decimal,
    pub max_distance: Decimal,
    pub max_number_of_orders: usize,
    /// Unfilled sells tolerated before new buys are suspended.
    pub wait_after: usize,
    pub wait_minutes: u64,
    /// Used to derive the gap when none is set.
    #[serde(default)]
    pub profit: Decimal,
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
}

impl StrategyConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            symbol: env::var("CHASER_SYMBOL").map_err(|_| ConfigError::Missing("CHASER_SYMBOL"))?,
            quantity: required("CHASER_QUANTITY")?,
            gap: optional("CHASER_GAP")?.unwrap_or_default(),
            max_distance: required("CHASER_MAX_DISTANCE")?,
            max_number_of_orders: required("CHASER_MAX_NUMBER_OF_ORDERS")?,
            wait_after: required("CHASER_WAIT_AFTER")?,
            wait_minutes: required("CHASER_WAIT_MINUTES")?,
            profit: optional("CHASER_PROFIT")?.unwrap_or_default(),
            quote_currency: env::var("CHASER_QUOTE_CURRENCY").unwrap_or_else(|_| default_quote_currency()),
        })
    }

    /// Validates the settings and derives the gap from the profit when the gap is unset.
    pub fn resolve(mut self) -> Result<Self, ConfigError> {
        if self.gap.is_zero() && self.profit.is_zero() {
            return Err(ConfigError::MissingGapOrProfit);
        }

        if self.quantity <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "quantity",
                reason: format!("must be positive, got {}", self.quantity),
            });
        }

        if self.gap.is_zero() {
            self.gap = self
                .profit
                .checked_div(self.quantity)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "profit",
                    reason: format!("{} / {} is not representable", self.profit, self.quantity),
                })?;
        }

        Ok(self)
    }

    pub fn instance_id(&self) -> String {
        format!(
            "chaser-{}-{}-{}-{}",
            self.symbol, self.max_distance, self.quantity, self.gap
        )
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.wait_minutes.saturating_mul(60))
    }
}

fn optional<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                field: key,
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn required<T: FromStr>(key: &'static str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    optional(key)?.ok_or(ConfigError::Missing(key))
}
