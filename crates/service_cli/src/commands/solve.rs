//! Solve command implementation
//!
//! Finds the market equilibrium and the surplus split for a demand/supply
//! pairing.

use market_equilibrium::equilibrium::{
    validate_equilibrium, CurvePoints, EquilibriumResult, MarketEquilibrium,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{cell, render_table, MarketArgs, OutputFormat};
use crate::config::CliConfig;
use crate::Result;

#[derive(Serialize)]
struct SolveReport<'a> {
    equilibrium: Option<&'a EquilibriumResult>,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve_points: Option<CurvePoints>,
}

/// Run the solve command
pub fn run(
    market: &MarketArgs,
    format: OutputFormat,
    points: bool,
    config: &CliConfig,
) -> Result<()> {
    let (demand, supply) = market.curves(&config.defaults)?;
    info!(demand = %demand, supply = %supply, "Solving market");

    let solver = MarketEquilibrium::with_config(config.engine.clone())
        .demand(demand)
        .supply(supply);
    if !market.symbolic {
        solver.validate()?;
    }
    let result = solver.solve()?;
    let valid = validate_equilibrium(result.as_ref());
    if result.is_some() && !valid {
        warn!("Equilibrium has a negative field");
    }

    let engine = &config.engine;
    let curve_points = if points {
        result
            .as_ref()
            .and_then(|r| r.curve_points(engine.plot_price_cap, engine.plot_samples))
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let report = SolveReport {
                equilibrium: result.as_ref(),
                valid,
                curve_points,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => match &result {
            Some(result) => {
                print!("{}", render_table(&summary_rows(result)));
                if let Some(points) = curve_points {
                    print!("{}", render_table(&point_rows(&points)));
                }
            }
            None => println!("No equilibrium: the curves do not intersect at a non-negative price"),
        },
    }

    info!(found = result.is_some(), valid, "Solve complete");
    Ok(())
}

fn summary_rows(result: &EquilibriumResult) -> Vec<Vec<String>> {
    let row = |field: &str, value: String| vec![field.to_string(), value];
    vec![
        row("Field", "Value".to_string()),
        row("Demand", result.demand_equation().to_string()),
        row("Supply", result.supply_equation().to_string()),
        row("Price", cell(result.price())),
        row("Quantity", cell(result.quantity())),
        row("Consumer surplus", cell(result.consumer_surplus())),
        row("Producer surplus", cell(result.producer_surplus())),
        row("Total surplus", cell(result.total_surplus())),
        row("Inverse demand", format!("p = {}", result.inverse_demand())),
        row("Inverse supply", format!("p = {}", result.inverse_supply())),
    ]
}

fn point_rows(points: &CurvePoints) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Price".to_string(),
        "Demand".to_string(),
        "Supply".to_string(),
    ]];
    // Demand and supply skip different prices, so join on price
    let mut supply = points.supply.iter().peekable();
    for &(price, quantity) in &points.demand {
        while supply.next_if(|&&(p, _)| p < price).is_some() {}
        let matched = supply
            .next_if(|&&(p, _)| p == price)
            .map(|&(_, q)| format!("{:.4}", q));
        rows.push(vec![
            format!("{:.4}", price),
            format!("{:.4}", quantity),
            matched.unwrap_or_default(),
        ]);
    }
    rows
}
