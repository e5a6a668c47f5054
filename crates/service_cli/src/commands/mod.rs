//! Command implementations for the `market` CLI.

use clap::{Args, ValueEnum};
use market_core::symbolic::Symbol;
use market_core::symbols::{self, PRICE, QUANTITY};
use market_equilibrium::curves::{family, FamilyDefaults, FunctionType, MarketFunction};
use market_equilibrium::equilibrium::Outcome;

use crate::{CliError, Result};

pub mod check;
pub mod evaluate;
pub mod families;
pub mod solve;
pub mod sweep;

/// Output format shared by every command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// A demand/supply pairing with parameter assignments
#[derive(Debug, Clone, Args)]
pub struct MarketArgs {
    /// Demand family (linear_demand, power_demand, exponential_demand, quadratic_demand)
    #[arg(short, long, default_value = "linear_demand")]
    pub demand: FunctionType,

    /// Supply family (linear_supply, power_supply, exponential_supply, quadratic_supply)
    #[arg(short, long, default_value = "linear_supply")]
    pub supply: FunctionType,

    /// Parameter assignment such as `a=120`; repeatable
    #[arg(short = 'P', long = "param", value_parser = parse_assignment)]
    pub params: Vec<(Symbol, f64)>,

    /// Keep parameters without an assignment symbolic instead of using defaults
    #[arg(long)]
    pub symbolic: bool,
}

impl MarketArgs {
    /// Build the demand and supply curves.
    pub fn curves(&self, defaults: &FamilyDefaults) -> Result<(MarketFunction, MarketFunction)> {
        if !self.demand.is_demand() {
            return Err(CliError::InvalidArgument(format!(
                "{} is not a demand family",
                self.demand
            )));
        }
        if !self.supply.is_supply() {
            return Err(CliError::InvalidArgument(format!(
                "{} is not a supply family",
                self.supply
            )));
        }
        Ok((
            build_curve(self.demand, &self.params, defaults, self.symbolic),
            build_curve(self.supply, &self.params, defaults, self.symbolic),
        ))
    }
}

/// Build one curve; the last assignment of a parameter wins.
pub fn build_curve(
    function_type: FunctionType,
    params: &[(Symbol, f64)],
    defaults: &FamilyDefaults,
    symbolic: bool,
) -> MarketFunction {
    let assigned = |symbol: &Symbol| {
        params
            .iter()
            .rev()
            .find(|(name, _)| name == symbol)
            .map(|(_, value)| *value)
    };
    let [first, second] = function_type.parameter_symbols();
    let (first, second) = (assigned(&first), assigned(&second));
    if symbolic {
        family(function_type, first, second)
    } else {
        defaults.function_with(function_type, first, second)
    }
}

/// Parse a `name=value` parameter assignment.
pub fn parse_assignment(s: &str) -> std::result::Result<(Symbol, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{}`", s))?;
    let symbol = parse_parameter(name)?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid value for {}: `{}`", symbol, value.trim()))?;
    if !value.is_finite() {
        return Err(format!("value for {} must be finite", symbol));
    }
    Ok((symbol, value))
}

/// Parse a curve parameter name (`a`, `b`, `c` or `d`).
pub fn parse_parameter(name: &str) -> std::result::Result<Symbol, String> {
    match symbols::lookup(name.trim()) {
        Some(symbol) if symbol != PRICE && symbol != QUANTITY => Ok(symbol),
        _ => Err(format!(
            "unknown parameter `{}`; expected one of a, b, c, d",
            name.trim()
        )),
    }
}

/// Short display of a result field for tables.
pub fn cell(outcome: &Outcome) -> String {
    match outcome.as_f64() {
        Some(value) => format!("{:.4}", value),
        None => outcome.to_string(),
    }
}

/// Render rows as a box-drawn table. The first row is the header.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|text| text.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}\n", left, segments.join(mid), right)
    };
    let line = |row: &Vec<String>| {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(c, w)| {
                let text = row.get(c).map(String::as_str).unwrap_or("");
                format!(" {}{} ", text, " ".repeat(w - text.chars().count()))
            })
            .collect();
        format!("│{}│\n", cells.join("│"))
    };

    let mut out = rule("┌", "┬", "┐");
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&line(row));
        if i == 0 && rows.len() > 1 {
            out.push_str(&rule("├", "┼", "┤"));
        }
    }
    out.push_str(&rule("└", "┴", "┘"));
    out
}
