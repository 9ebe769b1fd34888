//! Nuclear power plant parameters

use rstech_core::parameters::TechnoParameters;
use rstech_core::scalar::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters of a light water reactor running a once-through fuel cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NuclearParameters {
    #[serde(flatten)]
    pub techno: TechnoParameters,

    /// Thermal energy released per kg of natural uranium
    /// unit: kWh/kg
    /// default: 1.35e5
    pub uranium_energy_density: FloatValue,

    /// Cooling water withdrawn per unit of electricity
    /// unit: kg/kWh
    /// default: 2.82
    pub water_need: FloatValue,
}

impl Default for NuclearParameters {
    fn default() -> Self {
        Self {
            techno: TechnoParameters {
                capex_init: 5385.0,
                capex_init_unit: "$/kW".to_string(),
                opex_percentage: 0.0,
                wacc: 0.075,
                learning_rate: Some(0.01),
                lifetime: 60,
                construction_delay: 7,
                efficiency: 0.36,
                full_load_hours: 8000.0,
                ..Default::default()
            },
            uranium_energy_density: 1.35e5,
            water_need: 2.82,
        }
    }
}
