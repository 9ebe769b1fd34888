//! Flattening of evaluation results into the host's named tables.

use crate::consumption::CREDIT_SOURCE;
use crate::production::CohortOrigin;
use crate::scalar::FloatValue;
use crate::techno::TechnoOutputs;
use crate::variables::{self, column_name, wotaxes_column};
use ndarray::Array1;
use serde::Serialize;
use std::collections::BTreeMap;

pub const YEARS_COLUMN: &str = "years";

/// Values of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValues {
    Numbers(Vec<FloatValue>),
    Labels(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedColumn {
    pub name: String,
    pub values: ColumnValues,
}

/// Column-oriented table, the first column being the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTable {
    pub name: String,
    pub columns: Vec<NamedColumn>,
}

impl NamedTable {
    fn new(name: &str, years: &[FloatValue]) -> Self {
        Self {
            name: name.to_string(),
            columns: vec![NamedColumn {
                name: YEARS_COLUMN.to_string(),
                values: ColumnValues::Numbers(years.to_vec()),
            }],
        }
    }

    fn with(mut self, name: impl Into<String>, values: &Array1<FloatValue>) -> Self {
        self.columns.push(NamedColumn {
            name: name.into(),
            values: ColumnValues::Numbers(values.to_vec()),
        });
        self
    }

    fn with_labels(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.columns.push(NamedColumn {
            name: name.into(),
            values: ColumnValues::Labels(values),
        });
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnValues> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.values)
    }

    /// Numeric column by name
    pub fn numbers(&self, name: &str) -> Option<&[FloatValue]> {
        match self.column(name) {
            Some(ColumnValues::Numbers(values)) => Some(values),
            _ => None,
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Every output table of an evaluation, keyed by host name.
pub fn to_named_tables(outputs: &TechnoOutputs<FloatValue>) -> BTreeMap<String, NamedTable> {
    let definition = &outputs.definition;
    let name = definition.techno_name.as_str();
    let years: Vec<FloatValue> = outputs.years.as_array().to_vec();
    let prices = &outputs.prices;
    let mut tables = BTreeMap::new();
    let mut add = |table: NamedTable| {
        tables.insert(table.name.clone(), table);
    };

    add(NamedTable::new(variables::TECHNO_PRICES, &years)
        .with(name, &prices.total)
        .with(wotaxes_column(name), &prices.total_wotaxes));

    let mut detailed = NamedTable::new(variables::TECHNO_DETAILED_PRICES, &years)
        .with(name, &prices.total)
        .with(wotaxes_column(name), &prices.total_wotaxes)
        .with(format!("Capex_{name}"), &prices.capex)
        .with(format!("{name}_factory"), &prices.factory)
        .with("energy_costs", &prices.energy_costs)
        .with("transport", &prices.transport)
        .with("CO2_taxes_factory", &prices.co2_taxes)
        .with("margin", &prices.margin);
    for (stream, cost) in &prices.stream_costs {
        detailed = detailed.with(stream.clone(), cost);
    }
    add(detailed);

    let mut production = NamedTable::new(variables::TECHNO_PRODUCTION, &years).with(
        column_name(&definition.product, &definition.product_unit),
        &outputs.production,
    );
    for by_product in &definition.by_products {
        if let Some(values) = outputs.by_products.get(&by_product.name) {
            production = production.with(column_name(&by_product.name, &by_product.unit), values);
        }
    }
    add(production);

    add(NamedTable::new(variables::TECHNO_DETAILED_PRODUCTION, &years)
        .with(
            column_name(&definition.product, &definition.product_unit),
            &outputs.production,
        )
        .with("production_woratio", &outputs.production_woratio)
        .with("prod_from_invest", &outputs.production_from_invest)
        .with("retired_production", &outputs.retired_production));

    let mut consumption = NamedTable::new(variables::TECHNO_CONSUMPTION, &years);
    let mut consumption_woratio = NamedTable::new(variables::TECHNO_CONSUMPTION_WORATIO, &years);
    for need in &definition.needs {
        let column = column_name(&need.stream, need.kind.unit());
        if let Some(values) = outputs.consumption.get(&need.stream) {
            consumption = consumption.with(column.clone(), values);
        }
        if let Some(values) = outputs.consumption_woratio.get(&need.stream) {
            consumption_woratio = consumption_woratio.with(column, values);
        }
    }
    add(consumption);
    add(consumption_woratio);

    add(NamedTable::new(variables::CO2_EMISSIONS, &years)
        .with(name, &outputs.carbon_intensity.total)
        .with(column_name(name, "Mt"), &outputs.co2_emissions));

    let mut emissions_detailed = NamedTable::new(variables::CO2_EMISSIONS_DETAILED, &years);
    for (source, values) in &outputs.carbon_intensity.by_source {
        let column = if source == CREDIT_SOURCE {
            format!("{name}_credit")
        } else {
            source.clone()
        };
        emissions_detailed = emissions_detailed.with(column, values);
    }
    add(emissions_detailed.with(name, &outputs.carbon_intensity.total));

    let capacity = &outputs.installed_capacity;
    add(NamedTable::new(variables::INSTALLED_POWER, &years)
        .with(variables::NEW_POWER_PRODUCTION, &capacity.new_power_production)
        .with(variables::TOTAL_INSTALLED_POWER, &capacity.total_installed_power)
        .with(
            variables::REMOVED_POWER_PRODUCTION,
            &capacity.removed_power_production,
        ));

    add(age_distribution_table(outputs));

    add(NamedTable::new(variables::MEAN_AGE_PRODUCTION, &years)
        .with(variables::MEAN_AGE_COLUMN, &outputs.mean_age));

    add(NamedTable::new(variables::APPLIED_RATIO, &years)
        .with(variables::APPLIED_RATIO, &outputs.applied_ratio.values)
        .with_labels(
            "limiting_input",
            outputs
                .applied_ratio
                .limiting_input
                .iter()
                .map(|s| s.clone().unwrap_or_default())
                .collect(),
        ));

    if let Some(land_use) = &outputs.land_use {
        add(NamedTable::new(variables::LAND_USE_REQUIRED, &years)
            .with(column_name(name, "Gha"), land_use));
    }

    tables
}

/// One row per live `(year, age)` cohort.
fn age_distribution_table(outputs: &TechnoOutputs<FloatValue>) -> NamedTable {
    let rows = outputs.age_distribution.rows();
    let unit = &outputs.definition.product_unit;
    NamedTable {
        name: variables::AGE_DISTRIB_PRODUCTION.to_string(),
        columns: vec![
            NamedColumn {
                name: YEARS_COLUMN.to_string(),
                values: ColumnValues::Numbers(rows.iter().map(|r| r.year as FloatValue).collect()),
            },
            NamedColumn {
                name: "age".to_string(),
                values: ColumnValues::Numbers(rows.iter().map(|r| r.age as FloatValue).collect()),
            },
            NamedColumn {
                name: column_name("distrib_prod", unit),
                values: ColumnValues::Numbers(rows.iter().map(|r| r.production).collect()),
            },
            NamedColumn {
                name: "origin".to_string(),
                values: ColumnValues::Labels(
                    rows.iter()
                        .map(|r| match r.origin {
                            CohortOrigin::InitialFleet => "initial".to_string(),
                            CohortOrigin::NewBuild { commissioning_year } => {
                                commissioning_year.to_string()
                            }
                        })
                        .collect(),
                ),
            },
        ],
    }
}
