//! CLI error types.

use market_equilibrium::MarketError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by `market` commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("Failed to serialise output: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
