//! Default parameter tables for the curve families.

use super::{family, FunctionType, MarketFunction};
use std::collections::BTreeMap;

/// Default `(first, second)` parameters per family.
///
/// A plain configuration value: the engine never consults it. Front ends use
/// it to fill in parameters the user did not give. Deserialises from a table
/// keyed by family tag, for example in TOML:
///
/// ```toml
/// linear_demand = [120.0, 2.5]
/// power_supply = [1.0, 1.2]
/// ```
///
/// # Example
///
/// ```
/// use market_equilibrium::curves::{FamilyDefaults, FunctionType};
///
/// let defaults = FamilyDefaults::standard();
/// assert_eq!(defaults.get(FunctionType::LinearDemand), Some((100.0, 2.0)));
///
/// let demand = defaults.function(FunctionType::LinearDemand);
/// assert_eq!(demand.evaluate(16.0, None).unwrap(), 68.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FamilyDefaults {
    table: BTreeMap<FunctionType, (f64, f64)>,
}

impl FamilyDefaults {
    /// The standard table.
    ///
    /// | Family | Parameters |
    /// |---|---|
    /// | `linear_demand` | a = 100, b = 2 |
    /// | `power_demand` | a = 100, b = -0.5 |
    /// | `exponential_demand` | a = 0.05, b = 4.6 |
    /// | `quadratic_demand` | a = 100, b = 0.04 |
    /// | `linear_supply` | c = 20, d = 3 |
    /// | `power_supply` | c = 1, d = 1.5 |
    /// | `exponential_supply` | c = 0.05, d = 0 |
    /// | `quadratic_supply` | c = 0, d = 0.04 |
    pub fn standard() -> Self {
        let table = [
            (FunctionType::LinearDemand, (100.0, 2.0)),
            (FunctionType::PowerDemand, (100.0, -0.5)),
            (FunctionType::ExponentialDemand, (0.05, 4.6)),
            (FunctionType::QuadraticDemand, (100.0, 0.04)),
            (FunctionType::LinearSupply, (20.0, 3.0)),
            (FunctionType::PowerSupply, (1.0, 1.5)),
            (FunctionType::ExponentialSupply, (0.05, 0.0)),
            (FunctionType::QuadraticSupply, (0.0, 0.04)),
        ]
        .into_iter()
        .collect();
        Self { table }
    }

    /// Default parameters of a family, if the table has an entry.
    pub fn get(&self, function_type: FunctionType) -> Option<(f64, f64)> {
        self.table.get(&function_type).copied()
    }

    /// Set the defaults of a family.
    pub fn set(&mut self, function_type: FunctionType, parameters: (f64, f64)) {
        self.table.insert(function_type, parameters);
    }

    /// Returns a table where entries of `overrides` replace ours.
    pub fn merged(&self, overrides: &FamilyDefaults) -> FamilyDefaults {
        let mut table = self.table.clone();
        table.extend(overrides.table.iter().map(|(k, v)| (*k, *v)));
        FamilyDefaults { table }
    }

    /// Iterate over entries in family order.
    pub fn iter(&self) -> impl Iterator<Item = (FunctionType, (f64, f64))> + '_ {
        self.table.iter().map(|(k, v)| (*k, *v))
    }

    /// A market function of the family with its default parameters bound.
    /// Families without an entry stay fully symbolic.
    pub fn function(&self, function_type: FunctionType) -> MarketFunction {
        match self.get(function_type) {
            Some((first, second)) => family(function_type, Some(first), Some(second)),
            None => family(function_type, None, None),
        }
    }

    /// A market function where explicitly given parameters win over the
    /// defaults.
    pub fn function_with(
        &self,
        function_type: FunctionType,
        first: Option<f64>,
        second: Option<f64>,
    ) -> MarketFunction {
        let defaults = self.get(function_type);
        family(
            function_type,
            first.or(defaults.map(|d| d.0)),
            second.or(defaults.map(|d| d.1)),
        )
    }
}
