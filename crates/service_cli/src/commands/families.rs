//! Families command implementation
//!
//! Lists the curve families with their equations and configured defaults.

use market_equilibrium::curves::{FamilyDefaults, FunctionType};
use serde::Serialize;

use super::{render_table, OutputFormat};
use crate::config::CliConfig;
use crate::Result;

#[derive(Debug, Serialize)]
struct FamilyEntry {
    tag: FunctionType,
    side: &'static str,
    equation: String,
    defaults: Option<(f64, f64)>,
}

/// Run the families command
pub fn run(format: OutputFormat, config: &CliConfig) -> Result<()> {
    let entries = entries(&config.defaults);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Table => {
            let mut rows = vec![vec![
                "Family".to_string(),
                "Side".to_string(),
                "Equation".to_string(),
                "Defaults".to_string(),
            ]];
            rows.extend(entries.iter().map(|entry| {
                let [first, second] = entry.tag.parameter_symbols();
                let defaults = match entry.defaults {
                    Some((x, y)) => format!("{} = {}, {} = {}", first, x, second, y),
                    None => "symbolic".to_string(),
                };
                vec![
                    entry.tag.to_string(),
                    entry.side.to_string(),
                    entry.equation.clone(),
                    defaults,
                ]
            }));
            print!("{}", render_table(&rows));
        }
    }
    Ok(())
}

fn entries(defaults: &FamilyDefaults) -> Vec<FamilyEntry> {
    FunctionType::ALL
        .into_iter()
        .map(|tag| FamilyEntry {
            tag,
            side: if tag.is_demand() { "demand" } else { "supply" },
            equation: tag.equation().to_string(),
            defaults: defaults.get(tag),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_cover_every_family() {
        let entries = entries(&FamilyDefaults::standard());
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0].equation, "q = a - b*p");
        assert_eq!(entries[0].defaults, Some((100.0, 2.0)));
        assert_eq!(entries.iter().filter(|e| e.side == "supply").count(), 4);
    }

    #[test]
    fn test_json_uses_tags() {
        let entries = entries(&FamilyDefaults::default());
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[1]["tag"], "power_demand");
        assert!(json[1]["defaults"].is_null());
    }
}
