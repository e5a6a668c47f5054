//! Supply and demand curves.
//!
//! This module provides:
//! - [`FunctionType`]: The eight curve families
//! - [`TypedEquation`]: A price/quantity equation tagged with its family
//! - [`MarketFunction`]: A typed equation with stored parameter values, point
//!   evaluation and slope
//! - Family constructors ([`linear_demand`], [`power_supply`], ...)
//! - [`FamilyDefaults`]: Default parameter tables

mod defaults;
mod equation;
mod families;
mod function;
mod function_type;

pub use defaults::FamilyDefaults;
pub use equation::TypedEquation;
pub use families::{
    exponential_demand, exponential_supply, family, linear_demand, linear_supply, power_demand,
    power_supply, quadratic_demand, quadratic_supply,
};
pub use function::MarketFunction;
pub use function_type::FunctionType;
