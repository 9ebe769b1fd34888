//! Geological storage of captured CO2
//!
//! Stored CO2 is credited against the technology's emissions, so its carbon intensity is
//! negative as long as the electricity it uses is low-carbon enough.
//!
//! # Consumes
//!
//! - `carbon_capture` (Mt): one tonne captured per tonne stored
//! - `electricity` (TWh): compression and injection
//!
//! # Produces
//!
//! - `carbon_storage` (Mt)

use crate::parameters::{ModelDocument, CarbonStorageParameters};
use crate::streams::{CARBON_CAPTURE, CARBON_STORAGE, ELECTRICITY};
use ndarray::Array1;
use rstech_core::consumption::{StreamKind, StreamNeed, TechnoDefinition};
use rstech_core::errors::{RSTechError, RSTechResult};
use rstech_core::parameters::{overlay_toml, TechnoParameters};
use rstech_core::scalar::FloatValue;
use rstech_core::techno::TechnoModel;
use rstech_core::units::normalise_energy_demand;
use rstech_core::years::YearRange;
use serde::{Deserialize, Serialize};

/// CO2 removed from the atmosphere per tonne stored
const STORAGE_CREDIT: FloatValue = 1.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument<CarbonStorageParameters>")]
pub struct CarbonStorage {
    parameters: CarbonStorageParameters,
}

impl CarbonStorage {
    pub fn from_parameters(parameters: CarbonStorageParameters) -> RSTechResult<Self> {
        parameters.techno.validate()?;
        normalise_energy_demand(parameters.elec_demand, &parameters.elec_demand_unit)?;
        Ok(Self { parameters })
    }

    pub fn from_toml_str(source: &str) -> RSTechResult<Self> {
        Self::from_parameters(overlay_toml(&CarbonStorageParameters::default(), source)?)
    }

    /// Electricity per unit of CO2 stored
    /// unit: kWh/kg
    pub fn electricity_need(&self) -> RSTechResult<FloatValue> {
        normalise_energy_demand(self.parameters.elec_demand, &self.parameters.elec_demand_unit)
    }
}

impl TryFrom<ModelDocument<CarbonStorageParameters>> for CarbonStorage {
    type Error = RSTechError;

    fn try_from(document: ModelDocument<CarbonStorageParameters>) -> RSTechResult<Self> {
        Self::from_parameters(document.parameters)
    }
}

#[typetag::serde]
impl TechnoModel for CarbonStorage {
    fn name(&self) -> &str {
        "CarbonStorage"
    }

    fn parameters(&self) -> &TechnoParameters {
        &self.parameters.techno
    }

    fn definition(&self, years: &YearRange) -> RSTechResult<TechnoDefinition> {
        let n = years.len();
        Ok(TechnoDefinition {
            techno_name: self.name().to_string(),
            product: CARBON_STORAGE.to_string(),
            product_unit: "Mt".to_string(),
            needs: vec![
                StreamNeed {
                    stream: CARBON_CAPTURE.to_string(),
                    kind: StreamKind::Resource,
                    need: Array1::ones(n),
                },
                StreamNeed {
                    stream: ELECTRICITY.to_string(),
                    kind: StreamKind::Energy,
                    need: Array1::from_elem(n, self.electricity_need()?),
                },
            ],
            by_products: Vec::new(),
            direct_co2: Array1::from_elem(n, self.parameters.techno.co2_from_production),
            co2_credit: Array1::from_elem(n, STORAGE_CREDIT),
        })
    }
}
