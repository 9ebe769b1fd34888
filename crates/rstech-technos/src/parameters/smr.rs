//! Steam methane reforming parameters

use rstech_core::parameters::TechnoParameters;
use rstech_core::scalar::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters of a steam methane reformer.
///
/// The reforming reaction sets the water need and the CO2 released per unit of hydrogen:
///
/// $$ CH_4 + 2 H_2O \rightarrow CO_2 + 4 H_2 $$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmrParameters {
    #[serde(flatten)]
    pub techno: TechnoParameters,

    /// Electricity used by the reformer and its compressors per unit of hydrogen
    /// unit: `elec_demand_unit`
    /// default: 0.23
    pub elec_demand: FloatValue,

    /// default: "kWh/kg"
    pub elec_demand_unit: String,
}

impl Default for SmrParameters {
    fn default() -> Self {
        Self {
            techno: TechnoParameters {
                capex_init: 450.0,
                capex_init_unit: "$/kW".to_string(),
                opex_percentage: 0.047,
                wacc: 0.0878,
                learning_rate: Some(0.2),
                maximum_learning_capex_ratio: 0.9,
                lifetime: 25,
                construction_delay: 3,
                efficiency: 0.8,
                full_load_hours: 8000.0,
                ..Default::default()
            },
            elec_demand: 0.23,
            elec_demand_unit: "kWh/kg".to_string(),
        }
    }
}
