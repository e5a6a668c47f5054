//! Check command implementation
//!
//! Reports the effective configuration and runs a smoke solve with it.

use market_equilibrium::curves::{FamilyDefaults, FunctionType};
use market_equilibrium::equilibrium::MarketEquilibrium;
use market_equilibrium::EngineConfig;
use serde::Serialize;
use tracing::info;

use super::{render_table, OutputFormat};
use crate::config::{CliConfig, DEFAULT_CONFIG_FILE, ENV_LOG_LEVEL, ENV_REFERENCE_PRICE};
use crate::{CliError, Result};

#[derive(Serialize)]
struct CheckReport<'a> {
    source: Option<String>,
    log_level: String,
    engine: &'a EngineConfig,
    defaults: &'a FamilyDefaults,
    smoke_test_error: Option<String>,
}

/// Run the check command
pub fn run(format: OutputFormat, config: &CliConfig) -> Result<()> {
    let smoke = smoke_test(config);
    info!(ok = smoke.is_ok(), "Configuration check complete");

    match format {
        OutputFormat::Json => {
            let report = CheckReport {
                source: config.source.as_ref().map(|p| p.display().to_string()),
                log_level: config.log_level.to_string(),
                engine: &config.engine,
                defaults: &config.defaults,
                smoke_test_error: smoke.as_ref().err().map(ToString::to_string),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            let source = config
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| format!("none ({} not found)", DEFAULT_CONFIG_FILE));
            let engine = &config.engine;
            let rows = vec![
                vec!["Setting".to_string(), "Value".to_string()],
                vec!["Config file".to_string(), source],
                vec!["Log level".to_string(), config.log_level.to_string()],
                vec!["Reference price".to_string(), engine.reference_price.to_string()],
                vec![
                    "Root scan".to_string(),
                    format!(
                        "[{}, {}] x {}",
                        engine.scan_min_price, engine.scan_max_price, engine.scan_samples
                    ),
                ],
                vec![
                    "Brent solver".to_string(),
                    format!(
                        "tol {:e}, {} iterations",
                        engine.solver.tolerance, engine.solver.max_iterations
                    ),
                ],
                vec![
                    "Quadrature".to_string(),
                    format!(
                        "tol {:e}, depth {}",
                        engine.quadrature.tolerance, engine.quadrature.max_depth
                    ),
                ],
                vec![
                    "Plot range".to_string(),
                    format!("cap {}, {} samples", engine.plot_price_cap, engine.plot_samples),
                ],
                vec![
                    "Environment".to_string(),
                    format!("{}, {}", ENV_LOG_LEVEL, ENV_REFERENCE_PRICE),
                ],
                vec![
                    "Smoke test".to_string(),
                    match &smoke {
                        Ok(()) => "ok".to_string(),
                        Err(e) => format!("failed: {}", e),
                    },
                ],
            ];
            print!("{}", render_table(&rows));
        }
    }
    smoke
}

/// Solve the default linear market with the configured engine.
fn smoke_test(config: &CliConfig) -> Result<()> {
    let solver = MarketEquilibrium::with_config(config.engine.clone())
        .demand(config.defaults.function(FunctionType::LinearDemand))
        .supply(config.defaults.function(FunctionType::LinearSupply));
    match solver.solve_numeric()? {
        Some(_) => Ok(()),
        None => Err(CliError::InvalidArgument(
            "default linear market has no equilibrium".to_string(),
        )),
    }
}
