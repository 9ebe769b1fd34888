//! Electric heat pump delivering low temperature heat
//!
//! # Consumes
//!
//! - `electricity` (TWh): $1 / COP$ kWh per kWh of heat
//!
//! # Produces
//!
//! - `heat.lowtemperatureheat` (TWh)

use crate::parameters::{ModelDocument, HeatPumpParameters};
use crate::streams::{ELECTRICITY, LOW_TEMPERATURE_HEAT, ZERO_CELSIUS};
use ndarray::Array1;
use rstech_core::consumption::{StreamKind, StreamNeed, TechnoDefinition};
use rstech_core::errors::{RSTechError, RSTechResult};
use rstech_core::parameters::{overlay_toml, TechnoParameters};
use rstech_core::scalar::FloatValue;
use rstech_core::techno::TechnoModel;
use rstech_core::years::YearRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument<HeatPumpParameters>")]
pub struct HeatPump {
    parameters: HeatPumpParameters,
}

impl HeatPump {
    pub fn from_parameters(parameters: HeatPumpParameters) -> RSTechResult<Self> {
        parameters.techno.validate()?;
        if parameters.output_temperature <= parameters.input_temperature {
            return Err(RSTechError::InvalidParameter {
                name: "output_temperature".to_string(),
                reason: format!(
                    "must be above input_temperature ({} °C)",
                    parameters.input_temperature
                ),
            });
        }
        if parameters.carnot_efficiency <= 0.0 {
            return Err(RSTechError::InvalidParameter {
                name: "carnot_efficiency".to_string(),
                reason: "must be strictly positive".to_string(),
            });
        }
        Ok(Self { parameters })
    }

    pub fn from_toml_str(source: &str) -> RSTechResult<Self> {
        Self::from_parameters(overlay_toml(&HeatPumpParameters::default(), source)?)
    }

    /// Coefficient of performance
    pub fn cop(&self) -> FloatValue {
        let t_in = self.parameters.input_temperature + ZERO_CELSIUS;
        let t_out = self.parameters.output_temperature + ZERO_CELSIUS;
        self.parameters.carnot_efficiency * t_out / (t_out - t_in)
    }
}

impl TryFrom<ModelDocument<HeatPumpParameters>> for HeatPump {
    type Error = RSTechError;

    fn try_from(document: ModelDocument<HeatPumpParameters>) -> RSTechResult<Self> {
        Self::from_parameters(document.parameters)
    }
}

#[typetag::serde]
impl TechnoModel for HeatPump {
    fn name(&self) -> &str {
        "HeatPump"
    }

    fn parameters(&self) -> &TechnoParameters {
        &self.parameters.techno
    }

    fn definition(&self, years: &YearRange) -> RSTechResult<TechnoDefinition> {
        let n = years.len();
        Ok(TechnoDefinition {
            techno_name: self.name().to_string(),
            product: LOW_TEMPERATURE_HEAT.to_string(),
            product_unit: "TWh".to_string(),
            needs: vec![StreamNeed {
                stream: ELECTRICITY.to_string(),
                kind: StreamKind::Energy,
                need: Array1::from_elem(n, 1.0 / self.cop()),
            }],
            by_products: Vec::new(),
            direct_co2: Array1::from_elem(n, self.parameters.techno.co2_from_production),
            co2_credit: Array1::zeros(n),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn carnot_cop() {
        let pump = HeatPump::default();
        // 0.5 * 333.15 / 50
        assert_relative_eq!(pump.cop(), 3.3315, epsilon = 1e-12);
        let years = YearRange::new(2020, 2022).unwrap();
        let definition = pump.definition(&years).unwrap();
        assert_relative_eq!(definition.need(ELECTRICITY).unwrap().need[2], 1.0 / 3.3315);
    }

    #[test]
    fn reversed_temperatures_are_rejected() {
        let result = HeatPump::from_toml_str("input_temperature = 70.0");
        assert!(matches!(
            result,
            Err(RSTechError::InvalidParameter { ref name, .. }) if name == "output_temperature"
        ));
    }

    #[test]
    fn loading_checks_temperatures() {
        let reversed = r#"{
            "type": "HeatPump",
            "parameters": {"input_temperature": 60.0, "output_temperature": 10.0}
        }"#;
        let result: Result<Box<dyn TechnoModel>, _> = serde_json::from_str(reversed);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("output_temperature"), "{err}");

        let warmer = r#"{"type": "HeatPump", "parameters": {"input_temperature": 30.0}}"#;
        let model: Box<dyn TechnoModel> = serde_json::from_str(warmer).unwrap();
        let years = YearRange::new(2020, 2020).unwrap();
        let definition = model.definition(&years).unwrap();
        // 0.5 * 333.15 / 30
        assert_relative_eq!(definition.needs[0].need[0], 1.0 / 5.5525, max_relative = 1e-12);
    }

    #[test]
    fn warmer_source_raises_cop() {
        let pump = HeatPump::from_toml_str("input_temperature = 30.0").unwrap();
        assert!(pump.cop() > HeatPump::default().cop());
        assert_eq!(pump.parameters().lifetime, 20);
    }
}
