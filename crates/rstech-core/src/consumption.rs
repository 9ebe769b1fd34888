//! Consumption, by-products and CO2 emissions driven by production.
//!
//! A technology declares what it consumes and co-produces per unit of main product in a
//! [`TechnoDefinition`]. Every physical flow is that per-unit factor times production.

use crate::errors::{RSTechError, RSTechResult};
use crate::scalar::{FloatValue, Scalar};
use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nature of a consumed stream, which decides the unit of its consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    /// Energy carrier, consumption in TWh
    Energy,
    /// Material resource, consumption in Mt
    Resource,
}

impl StreamKind {
    pub fn unit(&self) -> &'static str {
        match self {
            StreamKind::Energy => "TWh",
            StreamKind::Resource => "Mt",
        }
    }
}

/// Quantity of a stream consumed per unit of product.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamNeed {
    pub stream: String,
    pub kind: StreamKind,
    /// Per-unit need for every simulated year, kWh/kWh or kg/kWh (kWh/kg, kg/kg for mass
    /// products)
    pub need: Array1<FloatValue>,
}

/// Secondary output produced alongside the main product.
#[derive(Debug, Clone, PartialEq)]
pub struct ByProduct {
    pub name: String,
    /// Unit of the by-product flow, e.g. "Mt"
    pub unit: String,
    /// Quantity per unit of main product
    pub factor: Array1<FloatValue>,
}

/// Physical description of a technology over the simulated years.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnoDefinition {
    pub techno_name: String,
    /// Name of the produced stream, e.g. "hydrogen.gaseous_hydrogen"
    pub product: String,
    /// Unit of the production flow, "TWh" or "Mt"
    pub product_unit: String,
    pub needs: Vec<StreamNeed>,
    pub by_products: Vec<ByProduct>,
    /// CO2 released by the process itself per unit of product
    pub direct_co2: Array1<FloatValue>,
    /// CO2 sequestered per unit of product
    pub co2_credit: Array1<FloatValue>,
}

impl TechnoDefinition {
    /// Per-unit needs keyed by stream.
    pub fn need_map(&self) -> BTreeMap<String, Array1<FloatValue>> {
        self.needs
            .iter()
            .map(|n| (n.stream.clone(), n.need.clone()))
            .collect()
    }

    pub fn need(&self, stream: &str) -> Option<&StreamNeed> {
        self.needs.iter().find(|n| n.stream == stream)
    }

    pub fn consumed_streams(&self) -> impl Iterator<Item = &str> {
        self.needs.iter().map(|n| n.stream.as_str())
    }
}

/// Source of the CO2 tied to the sequestration credit
pub const CREDIT_SOURCE: &str = "credit";
/// Source of the CO2 emitted by the process itself
pub const PRODUCTION_SOURCE: &str = "production";

/// Carbon intensity of the product split by source.
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonIntensity<T> {
    /// `production`, one entry per consumed stream and `credit` (negative)
    pub by_source: BTreeMap<String, Array1<T>>,
    pub total: Array1<T>,
}

/// Carbon intensity from the direct emissions, the emission factors of the consumed
/// streams and the sequestration credit.
///
/// Fails when a consumed stream has no emission factor.
pub fn carbon_intensity<T: Scalar>(
    definition: &TechnoDefinition,
    emission_factors: &BTreeMap<String, Array1<T>>,
) -> RSTechResult<CarbonIntensity<T>> {
    let mut by_source = BTreeMap::new();
    by_source.insert(
        PRODUCTION_SOURCE.to_string(),
        definition.direct_co2.mapv(T::real),
    );
    for need in &definition.needs {
        let factor = emission_factors.get(&need.stream).ok_or_else(|| {
            RSTechError::MissingInput(format!("CO2 emission factor of {}", need.stream))
        })?;
        let contribution = Zip::from(&need.need)
            .and(factor)
            .map_collect(|&n, &ef| T::real(n) * ef);
        by_source.insert(need.stream.clone(), contribution);
    }
    by_source.insert(
        CREDIT_SOURCE.to_string(),
        definition.co2_credit.mapv(|c| T::real(-c)),
    );

    let mut total = Array1::from_elem(definition.direct_co2.len(), T::zero());
    for contribution in by_source.values() {
        total = total + contribution;
    }
    Ok(CarbonIntensity { by_source, total })
}

/// Element-wise `factor * production`
pub fn scale_by_production<T: Scalar>(
    factor: ArrayView1<FloatValue>,
    production: ArrayView1<T>,
) -> Array1<T> {
    Zip::from(factor)
        .and(production)
        .map_collect(|&f, &p| T::real(f) * p)
}

/// Consumption of every consumed stream.
pub fn consumption<T: Scalar>(
    definition: &TechnoDefinition,
    production: ArrayView1<T>,
) -> BTreeMap<String, Array1<T>> {
    definition
        .needs
        .iter()
        .map(|n| (n.stream.clone(), scale_by_production(n.need.view(), production)))
        .collect()
}

/// Production of every by-product.
pub fn by_product_production<T: Scalar>(
    definition: &TechnoDefinition,
    production: ArrayView1<T>,
) -> BTreeMap<String, Array1<T>> {
    definition
        .by_products
        .iter()
        .map(|b| (b.name.clone(), scale_by_production(b.factor.view(), production)))
        .collect()
}

/// CO2 emissions, carbon intensity times production.
pub fn co2_emissions<T: Scalar>(
    intensity: ArrayView1<T>,
    production: ArrayView1<T>,
) -> Array1<T> {
    &intensity * &production
}
