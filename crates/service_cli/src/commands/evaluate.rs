//! Evaluate command implementation
//!
//! Reports the quantity and slope of a single curve at a price.

use market_core::symbolic::Symbol;
use market_equilibrium::curves::FunctionType;
use serde::Serialize;
use tracing::info;

use super::{build_curve, render_table, OutputFormat};
use crate::config::CliConfig;
use crate::Result;

#[derive(Debug, Serialize, PartialEq)]
struct PointReport {
    function: String,
    price: f64,
    quantity: f64,
    slope: f64,
}

/// Run the evaluate command
pub fn run(
    function_type: FunctionType,
    params: &[(Symbol, f64)],
    price: f64,
    format: OutputFormat,
    config: &CliConfig,
) -> Result<()> {
    let report = evaluate(function_type, params, price, config)?;
    info!(function = %report.function, price, "Evaluated curve");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            let rows = vec![
                vec!["Function".to_string(), report.function.clone()],
                vec!["Price".to_string(), format!("{:.4}", report.price)],
                vec!["Quantity".to_string(), format!("{:.4}", report.quantity)],
                vec!["Slope dq/dp".to_string(), format!("{:.4}", report.slope)],
            ];
            print!("{}", render_table(&rows));
        }
    }
    Ok(())
}

fn evaluate(
    function_type: FunctionType,
    params: &[(Symbol, f64)],
    price: f64,
    config: &CliConfig,
) -> Result<PointReport> {
    let function = build_curve(function_type, params, &config.defaults, false);
    Ok(PointReport {
        function: function.to_string(),
        price,
        quantity: function.evaluate(price, None)?,
        slope: function.get_slope(price, None)?,
    })
}
