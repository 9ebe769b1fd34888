//! Analytic gradients of every technology against complex-step derivatives.
//!
//! Every block returned by `TechnoModel::gradients` is recomputed by perturbing the input
//! series it is keyed on and reading back the output series it is keyed on. Pairs without a
//! block must have a zero derivative.

mod common;

use approx::assert_relative_eq;
use common::{all_technos, scenario_inputs};
use ndarray::{Array1, ArrayView1};
use num::complex::Complex64;
use rstech_core::gradients::{complex_step, COMPLEX_STEP};
use rstech_core::techno::{evaluate, TechnoInputs, TechnoModel, TechnoOutputs};
use rstech_core::variables;

type ComplexInputs = TechnoInputs<Complex64>;

/// Input series addressed by a `"table|column"` key.
fn input_series<'a>(inputs: &'a mut ComplexInputs, key: &str) -> &'a mut Array1<Complex64> {
    let (table, column) = key.split_once('|').unwrap();
    match table {
        variables::INVEST_LEVEL => &mut inputs.invest_level,
        variables::CO2_TAXES => &mut inputs.co2_taxes,
        variables::UTILISATION_RATIO => &mut inputs.utilisation_ratio,
        variables::ALL_STREAMS_DEMAND_RATIO => {
            inputs.stream_demand_ratios.get_mut(column).unwrap()
        }
        variables::ENERGY_PRICES | variables::RESOURCES_PRICE => {
            inputs.stream_prices.get_mut(column).unwrap()
        }
        variables::ENERGY_CO2_EMISSIONS | variables::RESOURCES_CO2_EMISSIONS => {
            inputs.stream_co2_emissions.get_mut(column).unwrap()
        }
        other => panic!("unexpected input table {other}"),
    }
}

/// Strip the unit suffix of a column, `"water (Mt)"` -> `"water"`.
fn stream_of(column: &str) -> &str {
    column.rsplit_once(" (").map_or(column, |(name, _)| name)
}

/// Output series addressed by a `"table|column"` key.
fn output_series(outputs: &TechnoOutputs<Complex64>, key: &str) -> Array1<Complex64> {
    let name = outputs.definition.techno_name.as_str();
    let (table, column) = key.split_once('|').unwrap();
    match table {
        variables::TECHNO_PRICES if column == name => outputs.prices.total.clone(),
        variables::TECHNO_PRICES => outputs.prices.total_wotaxes.clone(),
        variables::TECHNO_PRODUCTION if stream_of(column) == outputs.definition.product => {
            outputs.production.clone()
        }
        variables::TECHNO_PRODUCTION => outputs.by_products[stream_of(column)].clone(),
        variables::TECHNO_CONSUMPTION => outputs.consumption[stream_of(column)].clone(),
        variables::CO2_EMISSIONS if column == name => outputs.carbon_intensity.total.clone(),
        variables::CO2_EMISSIONS => outputs.co2_emissions.clone(),
        variables::MEAN_AGE_PRODUCTION => outputs.mean_age.clone(),
        variables::INSTALLED_POWER => outputs.installed_capacity.total_installed_power.clone(),
        variables::LAND_USE_REQUIRED => outputs.land_use.clone().unwrap(),
        other => panic!("unexpected output table {other}"),
    }
}

/// Every output series of `model` that the host may differentiate.
fn output_keys(model: &dyn TechnoModel, inputs: &TechnoInputs) -> Vec<String> {
    let definition = model.definition(&inputs.years).unwrap();
    let name = model.name();
    let mut keys = vec![
        variables::price_key(name),
        variables::price_wotaxes_key(name),
        variables::production_key(&definition.product, &definition.product_unit),
        variables::carbon_intensity_key(name),
        variables::co2_emissions_key(name),
        variables::mean_age_key(),
        variables::installed_power_key(),
    ];
    keys.extend(
        definition
            .by_products
            .iter()
            .map(|b| variables::production_key(&b.name, &b.unit)),
    );
    keys.extend(
        definition
            .needs
            .iter()
            .map(|need| variables::consumption_key(&need.stream, need.kind)),
    );
    if model.parameters().land_use_per_production.is_some() {
        keys.push(variables::land_use_key(name));
    }
    keys
}

/// Every optimised input series of `model`.
fn input_keys(model: &dyn TechnoModel, inputs: &TechnoInputs) -> Vec<String> {
    let definition = model.definition(&inputs.years).unwrap();
    let mut keys = vec![
        variables::invest_key(),
        variables::co2_tax_key(),
        variables::utilisation_ratio_key(),
    ];
    for need in &definition.needs {
        keys.push(variables::stream_price_key(need.kind, &need.stream));
        keys.push(variables::emission_factor_key(need.kind, &need.stream));
        keys.push(variables::demand_ratio_key(&need.stream));
    }
    keys
}

fn check_all_blocks(model: &dyn TechnoModel, inputs: &TechnoInputs) {
    let jacobian = model.gradients(inputs).unwrap();
    assert!(!jacobian.is_empty());
    let lifted = inputs.lift::<Complex64>();
    for ((output, input), analytic) in jacobian.iter() {
        let mut base = lifted.clone();
        let x: Array1<f64> = input_series(&mut base, input).mapv(|v| v.re);
        let numerical = complex_step(x.view(), |z: ArrayView1<Complex64>| {
            let mut perturbed = lifted.clone();
            input_series(&mut perturbed, input).assign(&z);
            output_series(&evaluate(model, &perturbed).unwrap(), output)
        });
        assert_eq!(analytic.dim(), numerical.dim(), "{output} / {input}");
        for ((i, j), &value) in analytic.indexed_iter() {
            assert_relative_eq!(
                value,
                numerical[[i, j]],
                max_relative = 1e-5,
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn test_smr_gradients() {
    let technos = all_technos();
    let model = technos[0].as_ref();
    check_all_blocks(model, &common::smr_inputs());
}

#[test]
fn test_every_techno_gradients() {
    for model in all_technos() {
        let inputs = scenario_inputs(model.as_ref(), 150.0);
        check_all_blocks(model.as_ref(), &inputs);
    }
}

#[test]
fn test_declared_pairs() {
    for model in all_technos() {
        let inputs = scenario_inputs(model.as_ref(), 150.0);
        let jacobian = model.gradients(&inputs).unwrap();
        let definition = model.definition(&inputs.years).unwrap();
        let name = model.name();
        let invest = variables::invest_key();

        for output in [
            variables::price_key(name),
            variables::price_wotaxes_key(name),
            variables::production_key(&definition.product, &definition.product_unit),
            variables::co2_emissions_key(name),
            variables::mean_age_key(),
            variables::installed_power_key(),
        ] {
            assert!(jacobian.contains(&output, &invest), "{output} / {invest}");
        }
        assert!(jacobian.contains(&variables::price_key(name), &variables::co2_tax_key()));
        assert!(!jacobian.contains(
            &variables::price_wotaxes_key(name),
            &variables::co2_tax_key()
        ));
        let emissions = variables::co2_emissions_key(name);
        assert!(jacobian.contains(&emissions, &variables::utilisation_ratio_key()));

        for need in &definition.needs {
            let consumption = variables::consumption_key(&need.stream, need.kind);
            for input in [
                invest.clone(),
                variables::utilisation_ratio_key(),
                variables::demand_ratio_key(&need.stream),
            ] {
                assert!(jacobian.contains(&consumption, &input), "{consumption} / {input}");
            }
            assert!(jacobian.contains(&emissions, &variables::demand_ratio_key(&need.stream)));
            let factor = variables::emission_factor_key(need.kind, &need.stream);
            assert!(jacobian.contains(&variables::carbon_intensity_key(name), &factor));
            assert!(!jacobian.contains(&variables::price_wotaxes_key(name), &factor));
        }
        for input in [invest.clone(), variables::utilisation_ratio_key()] {
            assert_eq!(
                jacobian.contains(&variables::land_use_key(name), &input),
                model.parameters().land_use_per_production.is_some()
            );
        }
    }
}

#[test]
fn test_missing_blocks_are_zero() {
    for model in all_technos() {
        let model = model.as_ref();
        let inputs = scenario_inputs(model, 150.0);
        let jacobian = model.gradients(&inputs).unwrap();
        let outputs = output_keys(model, &inputs);
        let lifted = inputs.lift::<Complex64>();
        let n = inputs.years.len();

        for input in input_keys(model, &inputs) {
            for j in 0..n {
                let mut perturbed = lifted.clone();
                input_series(&mut perturbed, &input)[j] += Complex64::new(0.0, COMPLEX_STEP);
                let evaluated = evaluate(model, &perturbed).unwrap();
                for output in &outputs {
                    let column = output_series(&evaluated, output).mapv(|v| v.im / COMPLEX_STEP);
                    match jacobian.get(output, &input) {
                        Some(block) => {
                            for (i, &value) in column.iter().enumerate() {
                                assert_relative_eq!(
                                    block[[i, j]],
                                    value,
                                    max_relative = 1e-5,
                                    epsilon = 1e-9
                                );
                            }
                        }
                        None => {
                            let largest = column.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
                            assert!(
                                largest <= 1e-9,
                                "{output} / {input} has no block, column {j} is {largest}"
                            );
                        }
                    }
                }
            }
        }
    }
}
