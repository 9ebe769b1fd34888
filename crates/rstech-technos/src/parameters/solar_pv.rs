//! Solar photovoltaic parameters

use rstech_core::parameters::TechnoParameters;
use rstech_core::scalar::FloatValue;
use serde::{Deserialize, Serialize};

/// Yearly electricity produced per hectare of a utility-scale PV farm
/// unit: kWh/ha
pub const PV_PRODUCTION_DENSITY: FloatValue = 315_059.0;

/// Parameters of a utility-scale photovoltaic farm.
///
/// PV consumes no stream. Its land footprint follows from the production density:
/// 1 TWh needs $10^9 / density$ ha, i.e. $1 / density$ Gha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarPvParameters {
    #[serde(flatten)]
    pub techno: TechnoParameters,
}

impl Default for SolarPvParameters {
    fn default() -> Self {
        Self {
            techno: TechnoParameters {
                capex_init: 1077.0,
                capex_init_unit: "$/kW".to_string(),
                opex_percentage: 0.021,
                wacc: 0.075,
                learning_rate: Some(0.18),
                lifetime: 25,
                construction_delay: 1,
                full_load_hours: 1577.0,
                land_use_per_production: Some(1.0 / PV_PRODUCTION_DENSITY),
                ..Default::default()
            },
        }
    }
}
