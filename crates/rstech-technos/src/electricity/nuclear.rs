//! Nuclear fission power
//!
//! # Consumes
//!
//! - `uranium_fuel` (Mt): natural uranium burnt at the plant efficiency
//! - `water` (Mt): cooling water
//!
//! # Produces
//!
//! - `electricity` (TWh), without direct CO2 emissions

use crate::parameters::{ModelDocument, NuclearParameters};
use crate::streams::{ELECTRICITY, URANIUM_FUEL, WATER};
use ndarray::Array1;
use rstech_core::consumption::{StreamKind, StreamNeed, TechnoDefinition};
use rstech_core::errors::{RSTechError, RSTechResult};
use rstech_core::parameters::{overlay_toml, TechnoParameters};
use rstech_core::scalar::FloatValue;
use rstech_core::techno::TechnoModel;
use rstech_core::years::YearRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument<NuclearParameters>")]
pub struct Nuclear {
    parameters: NuclearParameters,
}

impl Nuclear {
    pub fn from_parameters(parameters: NuclearParameters) -> RSTechResult<Self> {
        parameters.techno.validate()?;
        if parameters.uranium_energy_density <= 0.0 {
            return Err(RSTechError::InvalidParameter {
                name: "uranium_energy_density".to_string(),
                reason: "must be strictly positive".to_string(),
            });
        }
        Ok(Self { parameters })
    }

    pub fn from_toml_str(source: &str) -> RSTechResult<Self> {
        Self::from_parameters(overlay_toml(&NuclearParameters::default(), source)?)
    }

    /// Uranium burnt per unit of electricity
    /// unit: kg/kWh
    pub fn uranium_need(&self, years: &YearRange) -> Array1<FloatValue> {
        let density = self.parameters.uranium_energy_density;
        self.parameters
            .techno
            .efficiency_series(years)
            .mapv(|efficiency| 1.0 / (efficiency * density))
    }
}

impl TryFrom<ModelDocument<NuclearParameters>> for Nuclear {
    type Error = RSTechError;

    fn try_from(document: ModelDocument<NuclearParameters>) -> RSTechResult<Self> {
        Self::from_parameters(document.parameters)
    }
}

#[typetag::serde]
impl TechnoModel for Nuclear {
    fn name(&self) -> &str {
        "Nuclear"
    }

    fn parameters(&self) -> &TechnoParameters {
        &self.parameters.techno
    }

    fn definition(&self, years: &YearRange) -> RSTechResult<TechnoDefinition> {
        let n = years.len();
        Ok(TechnoDefinition {
            techno_name: self.name().to_string(),
            product: ELECTRICITY.to_string(),
            product_unit: "TWh".to_string(),
            needs: vec![
                StreamNeed {
                    stream: URANIUM_FUEL.to_string(),
                    kind: StreamKind::Resource,
                    need: self.uranium_need(years),
                },
                StreamNeed {
                    stream: WATER.to_string(),
                    kind: StreamKind::Resource,
                    need: Array1::from_elem(n, self.parameters.water_need),
                },
            ],
            by_products: Vec::new(),
            direct_co2: Array1::from_elem(n, self.parameters.techno.co2_from_production),
            co2_credit: Array1::zeros(n),
        })
    }
}
