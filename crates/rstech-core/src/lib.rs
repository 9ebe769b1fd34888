//! Core engines of the techno-economic technology models.
//!
//! A technology turns a yearly investment trajectory into installed capacity, production,
//! consumption of upstream streams, CO2 emissions and a unit price. Every technology
//! shares the same engines:
//!
//! - [`capex`]: learning curve on cumulative investment
//! - [`production`]: investment to production, fleet aging and retirement
//! - [`ratio`]: production cut when consumed streams are scarce
//! - [`consumption`]: flows and carbon intensity driven by production
//! - [`price`]: factory, energy, transport and CO2 tax costs
//! - [`gradients`]: Jacobian containers and the complex-step reference
//!
//! [`techno`] wires them into a pipeline behind the [`techno::TechnoModel`] trait.
//! Engines are generic over [`scalar::Scalar`] so that their analytic derivatives can be
//! checked with complex steps.

pub mod capex;
pub mod consumption;
pub mod errors;
pub mod gradients;
pub mod parameters;
pub mod price;
pub mod production;
pub mod ratio;
pub mod scalar;
pub mod tables;
pub mod techno;
pub mod units;
pub mod utils;
pub mod variables;
pub mod years;
