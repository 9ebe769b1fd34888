//! Stream names and physical constants shared by the technologies.

use rstech_core::scalar::FloatValue;

pub const GASEOUS_HYDROGEN: &str = "hydrogen.gaseous_hydrogen";
pub const METHANE: &str = "methane";
pub const ELECTRICITY: &str = "electricity";
pub const LOW_TEMPERATURE_HEAT: &str = "heat.lowtemperatureheat";
pub const CARBON_CAPTURE: &str = "carbon_capture";
pub const CARBON_STORAGE: &str = "carbon_storage";
pub const WATER: &str = "water";
pub const URANIUM_FUEL: &str = "uranium_fuel";
pub const CO2_FROM_FLUE_GAS: &str = "CO2_from_flue_gas";

/// Molar masses
/// unit: g/mol
pub const MOLAR_MASS_H2: FloatValue = 2.016;
pub const MOLAR_MASS_H2O: FloatValue = 18.015;
pub const MOLAR_MASS_CO2: FloatValue = 44.01;

/// Lower heating value of hydrogen
/// unit: kWh/kg
pub const HYDROGEN_CALORIFIC_VALUE: FloatValue = 33.3;

/// Offset between Celsius and Kelvin
pub const ZERO_CELSIUS: FloatValue = 273.15;
