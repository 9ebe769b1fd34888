//! Names exchanged with the host platform.
//!
//! The host matches tables and columns on these exact strings, unit suffixes included.
//! Jacobian blocks are keyed by `"table|column"` on both sides.

use crate::consumption::StreamKind;

pub const INVEST_LEVEL: &str = "invest_level";
pub const INVEST_COLUMN: &str = "invest";
pub const INVEST_BEFORE_YEAR_START: &str = "invest_before_ystart";
pub const CO2_TAXES: &str = "CO2_taxes";
pub const CO2_TAX_COLUMN: &str = "CO2_tax";
pub const UTILISATION_RATIO: &str = "utilisation_ratio";
pub const ALL_STREAMS_DEMAND_RATIO: &str = "all_streams_demand_ratio";
pub const ENERGY_PRICES: &str = "energy_prices";
pub const RESOURCES_PRICE: &str = "resources_price";
pub const ENERGY_CO2_EMISSIONS: &str = "energy_CO2_emissions";
pub const RESOURCES_CO2_EMISSIONS: &str = "resources_CO2_emissions";

pub const TECHNO_PRICES: &str = "techno_prices";
pub const TECHNO_DETAILED_PRICES: &str = "techno_detailed_prices";
pub const TECHNO_PRODUCTION: &str = "techno_production";
pub const TECHNO_DETAILED_PRODUCTION: &str = "techno_detailed_production";
pub const TECHNO_CONSUMPTION: &str = "techno_consumption";
pub const TECHNO_CONSUMPTION_WORATIO: &str = "techno_consumption_woratio";
pub const CO2_EMISSIONS: &str = "CO2_emissions";
pub const CO2_EMISSIONS_DETAILED: &str = "CO2_emissions_detailed";
pub const INSTALLED_POWER: &str = "installed_power";
pub const AGE_DISTRIB_PRODUCTION: &str = "age_distrib_production";
pub const MEAN_AGE_PRODUCTION: &str = "mean_age_production";
pub const APPLIED_RATIO: &str = "applied_ratio";
pub const LAND_USE_REQUIRED: &str = "land_use_required";

pub const MEAN_AGE_COLUMN: &str = "mean age";
pub const TOTAL_INSTALLED_POWER: &str = "total_installed_power";
pub const NEW_POWER_PRODUCTION: &str = "new_power_production";
pub const REMOVED_POWER_PRODUCTION: &str = "removed_power_production";

/// `"table|column"`
pub fn variable_key(table: &str, column: &str) -> String {
    format!("{table}|{column}")
}

/// Column name carrying a physical unit, e.g. `"electricity (TWh)"`.
pub fn column_name(name: &str, unit: &str) -> String {
    format!("{name} ({unit})")
}

/// Price column without taxes
pub fn wotaxes_column(techno_name: &str) -> String {
    format!("{techno_name}_wotaxes")
}

/// Table holding the prices of a consumed stream
pub fn price_table(kind: StreamKind) -> &'static str {
    match kind {
        StreamKind::Energy => ENERGY_PRICES,
        StreamKind::Resource => RESOURCES_PRICE,
    }
}

/// Table holding the emission factors of a consumed stream
pub fn emission_factor_table(kind: StreamKind) -> &'static str {
    match kind {
        StreamKind::Energy => ENERGY_CO2_EMISSIONS,
        StreamKind::Resource => RESOURCES_CO2_EMISSIONS,
    }
}

pub fn invest_key() -> String {
    variable_key(INVEST_LEVEL, INVEST_COLUMN)
}

pub fn co2_tax_key() -> String {
    variable_key(CO2_TAXES, CO2_TAX_COLUMN)
}

pub fn utilisation_ratio_key() -> String {
    variable_key(UTILISATION_RATIO, UTILISATION_RATIO)
}

pub fn demand_ratio_key(stream: &str) -> String {
    variable_key(ALL_STREAMS_DEMAND_RATIO, stream)
}

pub fn stream_price_key(kind: StreamKind, stream: &str) -> String {
    variable_key(price_table(kind), stream)
}

pub fn emission_factor_key(kind: StreamKind, stream: &str) -> String {
    variable_key(emission_factor_table(kind), stream)
}

pub fn price_key(techno_name: &str) -> String {
    variable_key(TECHNO_PRICES, techno_name)
}

pub fn price_wotaxes_key(techno_name: &str) -> String {
    variable_key(TECHNO_PRICES, &wotaxes_column(techno_name))
}

/// Main product or by-product flow
pub fn production_key(name: &str, unit: &str) -> String {
    variable_key(TECHNO_PRODUCTION, &column_name(name, unit))
}

pub fn consumption_key(stream: &str, kind: StreamKind) -> String {
    variable_key(TECHNO_CONSUMPTION, &column_name(stream, kind.unit()))
}

/// Carbon intensity, kg CO2 per unit of product
pub fn carbon_intensity_key(techno_name: &str) -> String {
    variable_key(CO2_EMISSIONS, techno_name)
}

/// Emitted CO2 mass, Mt
pub fn co2_emissions_key(techno_name: &str) -> String {
    variable_key(CO2_EMISSIONS, &column_name(techno_name, "Mt"))
}

pub fn mean_age_key() -> String {
    variable_key(MEAN_AGE_PRODUCTION, MEAN_AGE_COLUMN)
}

pub fn land_use_key(techno_name: &str) -> String {
    variable_key(LAND_USE_REQUIRED, &column_name(techno_name, "Gha"))
}

pub fn installed_power_key() -> String {
    variable_key(INSTALLED_POWER, TOTAL_INSTALLED_POWER)
}
