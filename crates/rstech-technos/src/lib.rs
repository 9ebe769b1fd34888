//! Energy technologies built on the `rstech-core` engines
//!
//! Each technology is a thin [`TechnoModel`] implementation: it names its product, lists
//! the streams it consumes per unit produced and the CO2 it emits, and lets the shared
//! engines derive capex, production, prices and emissions.
//!
//! # Module Organisation
//!
//! Technologies are grouped by the energy they deliver:
//! - `hydrogen`: steam methane reforming
//! - `electricity`: nuclear and solar photovoltaics
//! - `heat`: electric heat pumps
//! - `carbon_storage`: geological CO2 storage
//!
//! # Parameters
//!
//! Each technology has an associated parameters struct in the `parameters` module whose
//! defaults describe a representative plant.
//!
//! [`TechnoModel`]: rstech_core::techno::TechnoModel

pub mod carbon_storage;
pub mod electricity;
pub mod heat;
pub mod hydrogen;
pub mod parameters;
pub mod streams;
