//! Technology parameters
//!
//! Each technology flattens the shared [`TechnoParameters`] and adds its own constants.
//! Defaults describe a representative plant of the technology, and any key of the host's
//! `techno_infos_dict` overrides them.
//!
//! [`TechnoParameters`]: rstech_core::parameters::TechnoParameters

use serde::Deserialize;

mod carbon_storage;
mod heat_pump;
mod nuclear;
mod smr;
mod solar_pv;

pub use carbon_storage::CarbonStorageParameters;
pub use heat_pump::HeatPumpParameters;
pub use nuclear::NuclearParameters;
pub use smr::SmrParameters;
pub use solar_pv::{SolarPvParameters, PV_PRODUCTION_DENSITY};

/// Serialised form of a technology.
///
/// Technologies deserialise through this document and then their `from_parameters`, so a
/// loaded configuration is checked like a constructed one.
#[derive(Debug, Deserialize)]
pub struct ModelDocument<P> {
    pub parameters: P,
}
