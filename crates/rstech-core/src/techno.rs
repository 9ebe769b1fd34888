//! The technology model interface and the evaluation pipeline shared by every technology.
//!
//! A technology only describes itself: its parameters and, through
//! [`TechnoModel::definition`], what it consumes and co-produces per unit of product.
//! Everything else runs through the shared engines:
//!
//! investment → capex → production from investment → fleet aging → applied ratio →
//! consumption and emissions → price
//!
//! [`evaluate`] runs the pipeline on any [`Scalar`], [`jacobian`] assembles the analytic
//! derivatives on `f64`.

use crate::capex::{capex_with_gradient, compute_capex, CapexConfig};
use crate::consumption::{
    by_product_production, carbon_intensity, co2_emissions, consumption, CarbonIntensity,
    TechnoDefinition,
};
use crate::errors::{RSTechError, RSTechResult};
use crate::gradients::{diagonal, scale_rows, Jacobian};
use crate::parameters::TechnoParameters;
use crate::price::{
    co2_tax_gradient, emission_factor_gradient, stream_costs, stream_price_gradient,
    PriceDrivers, PriceModel, PriceTable,
};
use crate::production::{AgeDistributionTable, FleetModel, InitialAgeDistribution};
use crate::ratio::{applied_ratio, applied_ratio_gradient, AppliedRatio};
use crate::scalar::{FloatValue, Scalar};
use crate::variables;
use crate::years::YearRange;
use log::debug;
use ndarray::{Array1, Zip};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Inputs of one evaluation, as supplied by the host.
///
/// Every series is indexed by `years`. Prices, emission factors and demand ratios of the
/// consumed streams are keyed by stream name.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnoInputs<T = FloatValue> {
    pub years: YearRange,
    /// unit: G$
    pub invest_level: Array1<T>,
    /// Investment of the `construction_delay` years before `year_start`, oldest first
    pub invest_before_year_start: Array1<T>,
    /// Production of the fleet installed before `year_start`
    pub initial_production: FloatValue,
    pub initial_age_distribution: InitialAgeDistribution,
    /// Transport cost per unit of product, before `transport_conversion`
    pub transport_cost: Array1<T>,
    /// unit: %
    pub transport_margin: Array1<T>,
    /// unit: %
    pub margin: Array1<T>,
    /// unit: $/tCO2
    pub co2_taxes: Array1<T>,
    /// unit: %
    pub utilisation_ratio: Array1<T>,
    pub stream_prices: BTreeMap<String, Array1<T>>,
    pub stream_co2_emissions: BTreeMap<String, Array1<T>>,
    /// Share of the demand of each stream that can be served, in %
    pub stream_demand_ratios: BTreeMap<String, Array1<T>>,
}

impl TechnoInputs<FloatValue> {
    /// Inputs without investment, transport or tax, 100% margins and full utilisation.
    pub fn new(years: YearRange, construction_delay: u32) -> Self {
        let n = years.len();
        Self {
            years,
            invest_level: Array1::zeros(n),
            invest_before_year_start: Array1::zeros(construction_delay as usize),
            initial_production: 0.0,
            initial_age_distribution: InitialAgeDistribution::default(),
            transport_cost: Array1::zeros(n),
            transport_margin: Array1::from_elem(n, 100.0),
            margin: Array1::from_elem(n, 100.0),
            co2_taxes: Array1::zeros(n),
            utilisation_ratio: Array1::from_elem(n, 100.0),
            stream_prices: BTreeMap::new(),
            stream_co2_emissions: BTreeMap::new(),
            stream_demand_ratios: BTreeMap::new(),
        }
    }

    /// Same inputs on another scalar type, typically `Complex64` for complex steps.
    pub fn lift<U: Scalar>(&self) -> TechnoInputs<U> {
        let lift = |a: &Array1<FloatValue>| a.mapv(U::real);
        let lift_map = |m: &BTreeMap<String, Array1<FloatValue>>| -> BTreeMap<String, Array1<U>> {
            m.iter().map(|(k, v)| (k.clone(), lift(v))).collect()
        };
        TechnoInputs {
            years: self.years,
            invest_level: lift(&self.invest_level),
            invest_before_year_start: lift(&self.invest_before_year_start),
            initial_production: self.initial_production,
            initial_age_distribution: self.initial_age_distribution.clone(),
            transport_cost: lift(&self.transport_cost),
            transport_margin: lift(&self.transport_margin),
            margin: lift(&self.margin),
            co2_taxes: lift(&self.co2_taxes),
            utilisation_ratio: lift(&self.utilisation_ratio),
            stream_prices: lift_map(&self.stream_prices),
            stream_co2_emissions: lift_map(&self.stream_co2_emissions),
            stream_demand_ratios: lift_map(&self.stream_demand_ratios),
        }
    }
}

impl<T: Scalar> TechnoInputs<T> {
    /// Check that every yearly series spans the simulated years.
    pub fn validate(&self) -> RSTechResult<()> {
        let series = [
            (variables::INVEST_LEVEL, &self.invest_level),
            ("transport_cost", &self.transport_cost),
            ("transport_margin", &self.transport_margin),
            ("margin", &self.margin),
            (variables::CO2_TAXES, &self.co2_taxes),
            (variables::UTILISATION_RATIO, &self.utilisation_ratio),
        ];
        for (name, values) in series {
            self.years.check_length(name, values.len())?;
        }
        let tables = [
            ("stream prices", &self.stream_prices),
            ("stream CO2 emissions", &self.stream_co2_emissions),
            (variables::ALL_STREAMS_DEMAND_RATIO, &self.stream_demand_ratios),
        ];
        for (table, map) in tables {
            for (stream, values) in map {
                self.years
                    .check_length(&format!("{table} of {stream}"), values.len())?;
            }
        }
        if self.initial_production < 0.0 {
            return Err(RSTechError::InvalidParameter {
                name: "initial_production".to_string(),
                reason: format!("{} is negative", self.initial_production),
            });
        }
        Ok(())
    }
}

/// Installed capacity derived from the production flows.
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledCapacity<T> {
    pub new_power_production: Array1<T>,
    pub total_installed_power: Array1<T>,
    pub removed_power_production: Array1<T>,
}

impl<T: Scalar> InstalledCapacity<T> {
    /// Convert yearly productions to capacities, `production * 1000 / full_load_hours`
    /// (TWh to GW).
    pub fn from_production(
        full_load_hours: FloatValue,
        new_production: &Array1<T>,
        production_woratio: &Array1<T>,
        retired_production: &Array1<T>,
    ) -> Self {
        let factor = T::real(1000.0 / full_load_hours);
        Self {
            new_power_production: new_production.mapv(|p| p * factor),
            total_installed_power: production_woratio.mapv(|p| p * factor),
            removed_power_production: retired_production.mapv(|p| p * factor),
        }
    }
}

/// Results of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnoOutputs<T> {
    pub years: YearRange,
    pub definition: TechnoDefinition,
    pub capex: Array1<T>,
    pub prices: PriceTable<T>,
    /// Production added by the plants commissioned each year
    pub production_from_invest: Array1<T>,
    /// Production of the live fleet before ratios are applied
    pub production_woratio: Array1<T>,
    pub production: Array1<T>,
    pub retired_production: Array1<T>,
    pub age_distribution: AgeDistributionTable<T>,
    /// unit: yr
    pub mean_age: Array1<T>,
    pub applied_ratio: AppliedRatio<T>,
    pub consumption: BTreeMap<String, Array1<T>>,
    pub consumption_woratio: BTreeMap<String, Array1<T>>,
    pub by_products: BTreeMap<String, Array1<T>>,
    pub carbon_intensity: CarbonIntensity<T>,
    /// unit: Mt
    pub co2_emissions: Array1<T>,
    pub installed_capacity: InstalledCapacity<T>,
    /// unit: Gha, for technologies with a land footprint
    pub land_use: Option<Array1<T>>,
}

/// A configured technology.
///
/// Implementors own their parameters and describe their physical needs. The default
/// [`compute`](TechnoModel::compute) and [`gradients`](TechnoModel::gradients) run the
/// shared pipeline.
#[typetag::serde(tag = "type")]
pub trait TechnoModel: Debug + Send + Sync {
    /// Name used for the technology's price and emission columns, e.g. "SMR"
    fn name(&self) -> &str;

    fn parameters(&self) -> &TechnoParameters;

    /// Per-unit needs, by-products and direct emissions over `years`.
    fn definition(&self, years: &YearRange) -> RSTechResult<TechnoDefinition>;

    fn compute(&self, inputs: &TechnoInputs) -> RSTechResult<TechnoOutputs<FloatValue>> {
        evaluate(self, inputs)
    }

    /// Partial derivatives of the outputs with respect to the optimised inputs.
    fn gradients(&self, inputs: &TechnoInputs) -> RSTechResult<Jacobian> {
        jacobian(self, inputs)
    }
}

/// Engines configured for one evaluation.
struct Engines {
    capex: CapexConfig,
    fleet: FleetModel,
    price: PriceModel,
}

impl Engines {
    fn configure<T: Scalar>(
        parameters: &TechnoParameters,
        inputs: &TechnoInputs<T>,
    ) -> RSTechResult<Self> {
        Ok(Self {
            capex: CapexConfig::from_parameters(
                parameters,
                inputs.initial_production,
                inputs.years.len(),
            )?,
            fleet: FleetModel::from_parameters(
                parameters,
                inputs.initial_production,
                &inputs.initial_age_distribution,
            ),
            price: PriceModel::from_parameters(parameters),
        })
    }
}

/// Run the full pipeline of `model` on `inputs`.
pub fn evaluate<T: Scalar, M: TechnoModel + ?Sized>(
    model: &M,
    inputs: &TechnoInputs<T>,
) -> RSTechResult<TechnoOutputs<T>> {
    let years = inputs.years;
    let n = years.len();
    debug!(
        "Evaluating {} over {}-{}",
        model.name(),
        years.year_start(),
        years.year_end()
    );
    inputs.validate()?;
    let parameters = model.parameters();
    let definition = model.definition(&years)?;
    let engines = Engines::configure(parameters, inputs)?;

    let capex = compute_capex(inputs.invest_level.view(), &engines.capex);
    let production_from_invest = engines.fleet.production_from_invest(
        inputs.invest_level.view(),
        inputs.invest_before_year_start.view(),
        capex.view(),
    )?;
    let age_distribution = engines
        .fleet
        .age_distribution(&years, production_from_invest.view());
    let production_woratio = engines
        .fleet
        .production_without_ratio(production_from_invest.view());
    let retired_production = engines
        .fleet
        .retired_production(production_from_invest.view());
    let mean_age = age_distribution.mean_age_over_years();

    let applied_ratio = applied_ratio(
        definition.consumed_streams(),
        &inputs.stream_demand_ratios,
        n,
        parameters.demand_ratio_smoothing,
    );
    let hundred = T::real(100.0);
    let production = Zip::from(&production_woratio)
        .and(&applied_ratio.values)
        .and(&inputs.utilisation_ratio)
        .map_collect(|&p, &ratio, &utilisation| p * ratio * utilisation / hundred);

    let consumed = consumption(&definition, production.view());
    let consumed_woratio = consumption(&definition, production_woratio.view());
    let by_products = by_product_production(&definition, production.view());
    let intensity = carbon_intensity(&definition, &inputs.stream_co2_emissions)?;
    let emissions = co2_emissions(intensity.total.view(), production.view());

    let costs = stream_costs(&definition.need_map(), &inputs.stream_prices)?;
    let prices = engines.price.compute_price(
        PriceDrivers {
            capex: capex.view(),
            transport_cost: inputs.transport_cost.view(),
            transport_margin: inputs.transport_margin.view(),
            margin: inputs.margin.view(),
            carbon_intensity: intensity.total.view(),
            co2_taxes: inputs.co2_taxes.view(),
        },
        costs,
    );

    let installed_capacity = InstalledCapacity::from_production(
        parameters.full_load_hours,
        &production_from_invest,
        &production_woratio,
        &retired_production,
    );
    let land_use = parameters
        .land_use_per_production
        .map(|factor| production.mapv(|p| p * T::real(factor)));

    debug!("Evaluated {}", model.name());
    Ok(TechnoOutputs {
        years,
        definition,
        capex,
        prices,
        production_from_invest,
        production_woratio,
        production,
        retired_production,
        age_distribution,
        mean_age,
        applied_ratio,
        consumption: consumed,
        consumption_woratio: consumed_woratio,
        by_products,
        carbon_intensity: intensity,
        co2_emissions: emissions,
        installed_capacity,
        land_use,
    })
}

/// Analytic Jacobian of the outputs of `model` at `inputs`.
///
/// Blocks are keyed by host names, see [`crate::variables`].
pub fn jacobian<M: TechnoModel + ?Sized>(
    model: &M,
    inputs: &TechnoInputs,
) -> RSTechResult<Jacobian> {
    let outputs = evaluate(model, inputs)?;
    let parameters = model.parameters();
    let engines = Engines::configure(parameters, inputs)?;
    let definition = &outputs.definition;
    let name = model.name();
    let n = inputs.years.len();
    debug!("Assembling gradients of {name}");

    let (_, d_capex) = capex_with_gradient(inputs.invest_level.view(), &engines.capex);
    let d_new = engines.fleet.production_from_invest_gradient(
        inputs.invest_level.view(),
        inputs.invest_before_year_start.view(),
        outputs.capex.view(),
        d_capex.view(),
    )?;
    let d_woratio = engines.fleet.production_without_ratio_gradient(d_new.view());
    let ratio_factor = &outputs.applied_ratio.values * &inputs.utilisation_ratio / 100.0;
    let d_production = scale_rows(d_woratio.view(), ratio_factor.view());

    let mut jac = Jacobian::new();
    let invest = variables::invest_key();
    let price = variables::price_key(name);
    let price_wotaxes = variables::price_wotaxes_key(name);
    let intensity = variables::carbon_intensity_key(name);
    let emissions = variables::co2_emissions_key(name);

    // ===== Prices =====
    let d_price_invest = engines
        .price
        .invest_gradient(d_capex.view(), inputs.margin.view());
    jac.insert(price.clone(), invest.clone(), d_price_invest.clone());
    jac.insert(price_wotaxes.clone(), invest.clone(), d_price_invest);
    jac.insert(
        price.clone(),
        variables::co2_tax_key(),
        diagonal(co2_tax_gradient(outputs.carbon_intensity.total.view()).view()),
    );
    for need in &definition.needs {
        let d_price =
            diagonal(stream_price_gradient(need.need.view(), inputs.margin.view()).view());
        let price_input = variables::stream_price_key(need.kind, &need.stream);
        jac.insert(price.clone(), price_input.clone(), d_price.clone());
        jac.insert(price_wotaxes.clone(), price_input, d_price);

        let factor_input = variables::emission_factor_key(need.kind, &need.stream);
        let d_taxed = emission_factor_gradient(
            need.need.view(),
            inputs.co2_taxes.view(),
            outputs.carbon_intensity.total.view(),
        );
        jac.insert(price.clone(), factor_input.clone(), diagonal(d_taxed.view()));

        // ===== Emissions =====
        jac.insert(intensity.clone(), factor_input.clone(), diagonal(need.need.view()));
        let d_emitted = &need.need * &outputs.production;
        jac.insert(emissions.clone(), factor_input, diagonal(d_emitted.view()));
    }

    // ===== Flows following production =====
    let d_utilisation = &outputs.production_woratio * &outputs.applied_ratio.values / 100.0;
    let ratio_inputs: Vec<(String, Array1<FloatValue>)> = definition
        .consumed_streams()
        .filter(|stream| inputs.stream_demand_ratios.contains_key(*stream))
        .map(|stream| {
            let d_ratio = applied_ratio_gradient(
                definition.consumed_streams(),
                &inputs.stream_demand_ratios,
                stream,
                n,
                parameters.demand_ratio_smoothing,
            );
            let d_flow =
                &outputs.production_woratio * &inputs.utilisation_ratio / 100.0 * d_ratio;
            (variables::demand_ratio_key(stream), d_flow)
        })
        .collect();

    let mut flows: Vec<(String, Array1<FloatValue>)> = vec![(
        variables::production_key(&definition.product, &definition.product_unit),
        Array1::ones(n),
    )];
    flows.extend(
        definition
            .by_products
            .iter()
            .map(|b| (variables::production_key(&b.name, &b.unit), b.factor.clone())),
    );
    flows.extend(definition.needs.iter().map(|need| {
        (
            variables::consumption_key(&need.stream, need.kind),
            need.need.clone(),
        )
    }));
    flows.push((emissions, outputs.carbon_intensity.total.clone()));
    if let Some(factor) = parameters.land_use_per_production {
        flows.push((variables::land_use_key(name), Array1::from_elem(n, factor)));
    }
    for (output, factor) in flows {
        jac.insert(
            output.clone(),
            invest.clone(),
            scale_rows(d_production.view(), factor.view()),
        );
        jac.insert(
            output.clone(),
            variables::utilisation_ratio_key(),
            diagonal((&factor * &d_utilisation).view()),
        );
        for (ratio_input, d_ratio) in &ratio_inputs {
            jac.insert(
                output.clone(),
                ratio_input.clone(),
                diagonal((&factor * d_ratio).view()),
            );
        }
    }

    // ===== Fleet =====
    jac.insert(
        variables::mean_age_key(),
        invest.clone(),
        engines
            .fleet
            .mean_age_gradient(outputs.production_from_invest.view(), d_new.view()),
    );
    jac.insert(
        variables::installed_power_key(),
        invest,
        d_woratio.mapv(|d| d * 1000.0 / parameters.full_load_hours),
    );

    debug!("Assembled {} gradient blocks for {name}", jac.len());
    Ok(jac)
}
