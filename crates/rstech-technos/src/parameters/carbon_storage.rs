//! Geological carbon storage parameters

use rstech_core::parameters::TechnoParameters;
use rstech_core::scalar::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters of CO2 injection into a deep saline aquifer.
///
/// Product and capex are expressed per tonne of CO2 stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonStorageParameters {
    #[serde(flatten)]
    pub techno: TechnoParameters,

    /// Electricity used for compression and injection per tonne stored
    /// unit: `elec_demand_unit`
    /// default: 10.0
    pub elec_demand: FloatValue,

    /// default: "kWh/t"
    pub elec_demand_unit: String,
}

impl Default for CarbonStorageParameters {
    fn default() -> Self {
        Self {
            techno: TechnoParameters {
                capex_init: 10.0,
                capex_init_unit: "$/t".to_string(),
                opex_percentage: 0.1,
                wacc: 0.1,
                learning_rate: None,
                lifetime: 35,
                construction_delay: 3,
                ..Default::default()
            },
            elec_demand: 10.0,
            elec_demand_unit: "kWh/t".to_string(),
        }
    }
}
