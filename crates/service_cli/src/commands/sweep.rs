//! Sweep command implementation
//!
//! Re-solves a market over an evenly spaced range of one parameter.

use market_core::symbolic::Symbol;
use market_equilibrium::equilibrium::{sweep_parameter, EquilibriumResult, MarketEquilibrium};
use serde::Serialize;
use tracing::info;

use super::{cell, render_table, MarketArgs, OutputFormat};
use crate::config::CliConfig;
use crate::{CliError, Result};

#[derive(Serialize)]
struct SweepPoint<'a> {
    value: f64,
    equilibrium: Option<&'a EquilibriumResult>,
}

/// Sweep range
#[derive(Debug, Clone, Copy)]
pub struct SweepRange {
    pub from: f64,
    pub to: f64,
    pub steps: usize,
}

impl SweepRange {
    /// Evenly spaced values from `from` to `to` inclusive.
    pub fn values(&self) -> Result<Vec<f64>> {
        if !(self.from.is_finite() && self.to.is_finite()) {
            return Err(CliError::InvalidArgument(
                "sweep bounds must be finite".to_string(),
            ));
        }
        match self.steps {
            0 => Err(CliError::InvalidArgument(
                "steps must be at least 1".to_string(),
            )),
            1 => Ok(vec![self.from]),
            n => {
                let step = (self.to - self.from) / (n - 1) as f64;
                Ok((0..n).map(|i| self.from + i as f64 * step).collect())
            }
        }
    }
}

/// Run the sweep command
pub fn run(
    market: &MarketArgs,
    parameter: &Symbol,
    range: SweepRange,
    format: OutputFormat,
    config: &CliConfig,
) -> Result<()> {
    let values = range.values()?;
    let (demand, supply) = market.curves(&config.defaults)?;
    info!(%parameter, points = values.len(), "Sweeping market");

    let solver = MarketEquilibrium::with_config(config.engine.clone())
        .demand(demand)
        .supply(supply);
    let results = sweep_parameter(&solver, parameter, &values)?;

    match format {
        OutputFormat::Json => {
            let points: Vec<SweepPoint<'_>> = values
                .iter()
                .zip(&results)
                .map(|(&value, result)| SweepPoint {
                    value,
                    equilibrium: result.as_ref(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
        OutputFormat::Table => print!("{}", render_table(&rows(parameter, &values, &results))),
    }

    let cleared = results.iter().filter(|r| r.is_some()).count();
    info!(cleared, total = results.len(), "Sweep complete");
    Ok(())
}

fn rows(
    parameter: &Symbol,
    values: &[f64],
    results: &[Option<EquilibriumResult>],
) -> Vec<Vec<String>> {
    let header = [parameter.name(), "Price", "Quantity", "CS", "PS", "Total"];
    let mut rows = vec![header.iter().map(|h| h.to_string()).collect()];
    for (value, result) in values.iter().zip(results) {
        let mut row = vec![format!("{:.4}", value)];
        match result {
            Some(result) => row.extend([
                cell(result.price()),
                cell(result.quantity()),
                cell(result.consumer_surplus()),
                cell(result.producer_surplus()),
                cell(result.total_surplus()),
            ]),
            None => row.push("no equilibrium".to_string()),
        }
        rows.push(row);
    }
    rows
}
