//! Scenario inputs shared by the integration tests.

#![allow(dead_code)]

use ndarray::{array, Array1};
use rstech_core::consumption::StreamKind;
use rstech_core::production::InitialAgeDistribution;
use rstech_core::techno::{TechnoInputs, TechnoModel};
use rstech_core::years::YearRange;
use rstech_technos::carbon_storage::CarbonStorage;
use rstech_technos::electricity::{Nuclear, SolarPv};
use rstech_technos::heat::HeatPump;
use rstech_technos::hydrogen::Smr;
use rstech_technos::streams::HYDROGEN_CALORIFIC_VALUE;

pub const YEAR_START: i32 = 2020;
pub const YEAR_END: i32 = 2050;

pub fn years() -> YearRange {
    YearRange::new(YEAR_START, YEAR_END).unwrap()
}

/// Every technology with its default parameters.
pub fn all_technos() -> Vec<Box<dyn TechnoModel>> {
    vec![
        Box::new(Smr::default()),
        Box::new(Nuclear::default()),
        Box::new(SolarPv::default()),
        Box::new(HeatPump::default()),
        Box::new(CarbonStorage::default()),
    ]
}

/// Reference reformer scenario: world SMR fleet of 2020 and a slowly growing investment.
pub fn smr_inputs() -> TechnoInputs {
    let model = Smr::default();
    let mut inputs = scenario_inputs(&model, 70.0 * HYDROGEN_CALORIFIC_VALUE * 0.75);
    inputs.invest_level = Array1::linspace(4.435, 5.093, years().len());
    inputs.invest_before_year_start = array![4.118, 4.212, 4.307];
    inputs
}

/// Inputs covering every stream consumed by `model`.
///
/// Prices, emission factors and demand ratios are plausible, distinct per stream, and vary
/// over time so that gradient blocks are not degenerate.
pub fn scenario_inputs(model: &dyn TechnoModel, initial_production: f64) -> TechnoInputs {
    let years = years();
    let n = years.len();
    let parameters = model.parameters();
    let mut inputs = TechnoInputs::new(years, parameters.construction_delay);
    inputs.invest_level = Array1::linspace(2.0, 3.5, n);
    inputs.invest_before_year_start =
        Array1::from_shape_fn(parameters.construction_delay as usize, |i| 1.5 + 0.1 * i as f64);
    inputs.initial_production = initial_production;
    inputs.initial_age_distribution = InitialAgeDistribution::uniform(parameters.lifetime);
    inputs.transport_cost = Array1::from_elem(n, 2.0);
    inputs.transport_margin = Array1::from_elem(n, 120.0);
    inputs.margin = Array1::from_elem(n, 110.0);
    inputs.co2_taxes = Array1::linspace(14.86, 50.29, n);
    inputs.utilisation_ratio = Array1::linspace(100.0, 92.0, n);

    let definition = model.definition(&years).unwrap();
    for (i, need) in definition.needs.iter().enumerate() {
        let shift = i as f64;
        let (price, factor) = match need.kind {
            StreamKind::Energy => (
                Array1::linspace(30.0 + 10.0 * shift, 45.0 + 10.0 * shift, n),
                Array1::linspace(0.2 + 0.05 * shift, 0.1, n),
            ),
            StreamKind::Resource => (
                Array1::linspace(1.4 + shift, 2.0 + shift, n),
                Array1::from_elem(n, 0.01 * (shift + 1.0)),
            ),
        };
        inputs.stream_prices.insert(need.stream.clone(), price);
        inputs.stream_co2_emissions.insert(need.stream.clone(), factor);
        inputs.stream_demand_ratios.insert(
            need.stream.clone(),
            Array1::linspace(100.0 - 3.0 * shift, 88.0 + shift, n),
        );
    }
    inputs
}
