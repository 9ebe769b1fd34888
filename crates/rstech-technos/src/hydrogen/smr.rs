//! Steam methane reforming
//!
//! Produces gaseous hydrogen from methane and water. The methane need follows the
//! conversion efficiency, water and CO2 follow the reforming stoichiometry.
//!
//! # Consumes
//!
//! - `methane` (TWh): $1 / \eta(t)$ kWh per kWh of hydrogen
//! - `electricity` (TWh): `elec_demand` converted to kWh per kWh of hydrogen
//! - `water` (Mt): two moles of water per four moles of hydrogen
//!
//! # Produces
//!
//! - `hydrogen.gaseous_hydrogen` (TWh)
//! - `CO2_from_flue_gas` (Mt): one mole of CO2 per four moles of hydrogen, also counted
//!   as direct emissions

use crate::parameters::{ModelDocument, SmrParameters};
use crate::streams::{
    CO2_FROM_FLUE_GAS, ELECTRICITY, GASEOUS_HYDROGEN, HYDROGEN_CALORIFIC_VALUE, METHANE,
    MOLAR_MASS_CO2, MOLAR_MASS_H2, MOLAR_MASS_H2O, WATER,
};
use ndarray::Array1;
use rstech_core::consumption::{ByProduct, StreamKind, StreamNeed, TechnoDefinition};
use rstech_core::errors::{RSTechError, RSTechResult};
use rstech_core::parameters::{overlay_toml, TechnoParameters};
use rstech_core::scalar::FloatValue;
use rstech_core::techno::TechnoModel;
use rstech_core::units::normalise_energy_demand;
use rstech_core::years::YearRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument<SmrParameters>")]
pub struct Smr {
    parameters: SmrParameters,
}

impl Smr {
    /// Configure a reformer, failing on inconsistent parameters or units.
    pub fn from_parameters(parameters: SmrParameters) -> RSTechResult<Self> {
        parameters.techno.validate()?;
        normalise_energy_demand(parameters.elec_demand, &parameters.elec_demand_unit)?;
        Ok(Self { parameters })
    }

    /// Configure a reformer from a TOML document overriding the default parameters.
    pub fn from_toml_str(source: &str) -> RSTechResult<Self> {
        Self::from_parameters(overlay_toml(&SmrParameters::default(), source)?)
    }

    /// Electricity per unit of hydrogen
    /// unit: kWh/kWh
    pub fn electricity_need(&self) -> RSTechResult<FloatValue> {
        let per_kg = normalise_energy_demand(
            self.parameters.elec_demand,
            &self.parameters.elec_demand_unit,
        )?;
        Ok(per_kg / HYDROGEN_CALORIFIC_VALUE)
    }

    /// Water per unit of hydrogen
    /// unit: kg/kWh
    pub fn water_need(&self) -> FloatValue {
        2.0 * MOLAR_MASS_H2O / (4.0 * MOLAR_MASS_H2) / HYDROGEN_CALORIFIC_VALUE
    }

    /// CO2 released by the reaction per unit of hydrogen
    /// unit: kg/kWh
    pub fn co2_production(&self) -> FloatValue {
        MOLAR_MASS_CO2 / (4.0 * MOLAR_MASS_H2) / HYDROGEN_CALORIFIC_VALUE
    }

    /// Methane per unit of hydrogen
    /// unit: kWh/kWh
    pub fn methane_need(&self, years: &YearRange) -> Array1<FloatValue> {
        self.parameters
            .techno
            .efficiency_series(years)
            .mapv(|efficiency| 1.0 / efficiency)
    }
}

impl TryFrom<ModelDocument<SmrParameters>> for Smr {
    type Error = RSTechError;

    fn try_from(document: ModelDocument<SmrParameters>) -> RSTechResult<Self> {
        Self::from_parameters(document.parameters)
    }
}

#[typetag::serde]
impl TechnoModel for Smr {
    fn name(&self) -> &str {
        "SMR"
    }

    fn parameters(&self) -> &TechnoParameters {
        &self.parameters.techno
    }

    fn definition(&self, years: &YearRange) -> RSTechResult<TechnoDefinition> {
        let n = years.len();
        let co2 = self.co2_production();
        Ok(TechnoDefinition {
            techno_name: self.name().to_string(),
            product: GASEOUS_HYDROGEN.to_string(),
            product_unit: "TWh".to_string(),
            needs: vec![
                StreamNeed {
                    stream: METHANE.to_string(),
                    kind: StreamKind::Energy,
                    need: self.methane_need(years),
                },
                StreamNeed {
                    stream: ELECTRICITY.to_string(),
                    kind: StreamKind::Energy,
                    need: Array1::from_elem(n, self.electricity_need()?),
                },
                StreamNeed {
                    stream: WATER.to_string(),
                    kind: StreamKind::Resource,
                    need: Array1::from_elem(n, self.water_need()),
                },
            ],
            by_products: vec![ByProduct {
                name: CO2_FROM_FLUE_GAS.to_string(),
                unit: "Mt".to_string(),
                factor: Array1::from_elem(n, co2),
            }],
            direct_co2: Array1::from_elem(n, co2 + self.parameters.techno.co2_from_production),
            co2_credit: Array1::zeros(n),
        })
    }
}
