//! Heat pump parameters

use rstech_core::parameters::TechnoParameters;
use rstech_core::scalar::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters of an electric heat pump delivering low temperature heat.
///
/// The coefficient of performance is a fraction of the Carnot limit between the source
/// and the delivery temperature:
///
/// $$ COP = \eta_{carnot} \frac{T_{out}}{T_{out} - T_{in}} $$
///
/// with both temperatures in kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatPumpParameters {
    #[serde(flatten)]
    pub techno: TechnoParameters,

    /// Share of the Carnot COP actually achieved
    /// default: 0.5
    pub carnot_efficiency: FloatValue,

    /// Temperature of the heat source
    /// unit: °C
    /// default: 10.0
    pub input_temperature: FloatValue,

    /// Temperature of the delivered heat
    /// unit: °C
    /// default: 60.0
    pub output_temperature: FloatValue,
}

impl Default for HeatPumpParameters {
    fn default() -> Self {
        Self {
            techno: TechnoParameters {
                capex_init: 718.0,
                capex_init_unit: "$/kW".to_string(),
                opex_percentage: 0.04,
                wacc: 0.075,
                learning_rate: Some(0.1),
                lifetime: 20,
                construction_delay: 1,
                full_load_hours: 2000.0,
                ..Default::default()
            },
            carnot_efficiency: 0.5,
            input_temperature: 10.0,
            output_temperature: 60.0,
        }
    }
}
