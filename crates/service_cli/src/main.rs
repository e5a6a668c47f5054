//! Market CLI - Command Line Operations for Equilibrium Analysis
//!
//! # Commands
//!
//! - `market solve` - Solve a demand/supply pairing for equilibrium and surplus
//! - `market evaluate` - Quantity and slope of one curve at a price
//! - `market sweep` - Re-solve a market over a range of one parameter
//! - `market families` - List curve families and their defaults
//! - `market check` - Report the effective configuration
//!
//! Configuration comes from `market.toml` (or `--config`), the
//! `MARKET_LOG_LEVEL` and `MARKET_REFERENCE_PRICE` environment variables and
//! command-line flags, in increasing order of precedence.

use anyhow::Context;
use clap::{Parser, Subcommand};
use market_core::symbolic::Symbol;
use market_equilibrium::curves::FunctionType;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use commands::sweep::SweepRange;
use commands::{parse_assignment, parse_parameter, MarketArgs, OutputFormat};
use config::{build_config, CliArgs, LogLevel};

/// Market equilibrium and surplus analysis
#[derive(Parser)]
#[command(name = "market")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path [default: market.toml if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Price at which slope directions are checked
    #[arg(long, global = true)]
    reference_price: Option<f64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a market for its equilibrium and surplus
    Solve {
        #[command(flatten)]
        market: MarketArgs,

        /// Also sample both curves for plotting
        #[arg(long)]
        points: bool,
    },

    /// Evaluate one curve at a price
    Evaluate {
        /// Curve family
        #[arg(short = 't', long = "type")]
        function_type: FunctionType,

        /// Price to evaluate at
        #[arg(short, long, allow_negative_numbers = true)]
        price: f64,

        /// Parameter assignment such as `b=4`; repeatable
        #[arg(short = 'P', long = "param", value_parser = parse_assignment)]
        params: Vec<(Symbol, f64)>,
    },

    /// Re-solve a market over an evenly spaced parameter range
    Sweep {
        #[command(flatten)]
        market: MarketArgs,

        /// Parameter to sweep (a, b, c or d)
        #[arg(long, value_parser = parse_parameter)]
        over: Symbol,

        /// First value
        #[arg(long, allow_negative_numbers = true)]
        from: f64,

        /// Last value
        #[arg(long, allow_negative_numbers = true)]
        to: f64,

        /// Number of values
        #[arg(long, default_value = "11")]
        steps: usize,
    },

    /// List curve families with their default parameters
    Families,

    /// Check the effective configuration
    Check,
}

impl Cli {
    fn config_args(&self) -> CliArgs {
        CliArgs {
            config_file: self.config.clone(),
            log_level: self.log_level,
            verbose: self.verbose,
            reference_price: self.reference_price,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli.config_args()).context("Failed to load configuration")?;

    init_tracing(config.log_level.as_filter_str());
    debug!(
        source = ?config.source,
        log_level = %config.log_level,
        reference_price = config.engine.reference_price,
        "Configuration loaded"
    );

    let format = cli.format;
    match cli.command {
        Commands::Solve { market, points } => {
            commands::solve::run(&market, format, points, &config)
        }
        Commands::Evaluate {
            function_type,
            price,
            params,
        } => commands::evaluate::run(function_type, &params, price, format, &config),
        Commands::Sweep {
            market,
            over,
            from,
            to,
            steps,
        } => {
            let range = SweepRange { from, to, steps };
            commands::sweep::run(&market, &over, range, format, &config)
        }
        Commands::Families => commands::families::run(format, &config),
        Commands::Check => commands::check::run(format, &config),
    }?;

    Ok(())
}
