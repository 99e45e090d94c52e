use thiserror::Error;

/// Errors raised while loading or validating the strategy configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("please set either gap or profit")]
    MissingGapOrProfit,
}

/// Errors reported by the order collaborators.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("unknown order: {0}")]
    UnknownOrder(String),

    #[error("order backup failed: {0}")]
    Backup(#[from] std::io::Error),

    #[error("order backup is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}
