//! Utility-scale solar photovoltaics
//!
//! Consumes no stream and emits no CO2. The only physical flow besides electricity is
//! the land occupied by the panels.

use crate::parameters::{ModelDocument, SolarPvParameters};
use crate::streams::ELECTRICITY;
use ndarray::Array1;
use rstech_core::consumption::TechnoDefinition;
use rstech_core::errors::{RSTechError, RSTechResult};
use rstech_core::parameters::{overlay_toml, TechnoParameters};
use rstech_core::techno::TechnoModel;
use rstech_core::years::YearRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument<SolarPvParameters>")]
pub struct SolarPv {
    parameters: SolarPvParameters,
}

impl SolarPv {
    pub fn from_parameters(parameters: SolarPvParameters) -> RSTechResult<Self> {
        parameters.techno.validate()?;
        Ok(Self { parameters })
    }

    pub fn from_toml_str(source: &str) -> RSTechResult<Self> {
        Self::from_parameters(overlay_toml(&SolarPvParameters::default(), source)?)
    }
}

impl TryFrom<ModelDocument<SolarPvParameters>> for SolarPv {
    type Error = RSTechError;

    fn try_from(document: ModelDocument<SolarPvParameters>) -> RSTechResult<Self> {
        Self::from_parameters(document.parameters)
    }
}

#[typetag::serde]
impl TechnoModel for SolarPv {
    fn name(&self) -> &str {
        "SolarPv"
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
            needs: Vec::new(),
            by_products: Vec::new(),
            direct_co2: Array1::from_elem(n, self.parameters.techno.co2_from_production),
            co2_credit: Array1::zeros(n),
        })
    }
}
