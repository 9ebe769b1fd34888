//! Unit normalisation for capex and energy demands.
//!
//! Capex is normalised to currency per unit of *yearly* production of the product
//! ($/MWh for energy products, $/t for mass products). Energy demands are normalised to
//! kWh per kg of product, which is numerically the same as MWh/t, and as kWh/kWh for
//! energy products.
//!
//! Unknown units are configuration errors: silently defaulting would corrupt every price
//! and emission computed downstream.

use crate::errors::{RSTechError, RSTechResult};
use crate::scalar::FloatValue;
use std::fmt;
use std::str::FromStr;

/// kWh per GJ
pub const KWH_PER_GJ: FloatValue = 277.78;

/// Units accepted for `Capex_init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapexUnit {
    DollarPerKw,
    EuroPerKw,
    DollarPerMw,
    DollarPerKwh,
    DollarPerMwh,
    DollarPerTonne,
    DollarPerKg,
}

impl CapexUnit {
    /// Convert a capex expressed in this unit to the canonical $/MWh or $/t.
    ///
    /// `full_load_hours` converts installed power to yearly production and `euro_dollar`
    /// is the exchange rate used for euro-denominated capex.
    pub fn to_canonical(
        &self,
        capex: FloatValue,
        full_load_hours: FloatValue,
        euro_dollar: FloatValue,
    ) -> RSTechResult<FloatValue> {
        let needs_hours = matches!(
            self,
            CapexUnit::DollarPerKw | CapexUnit::EuroPerKw | CapexUnit::DollarPerMw
        );
        if needs_hours && full_load_hours <= 0.0 {
            return Err(RSTechError::InvalidParameter {
                name: "full_load_hours".to_string(),
                reason: format!("must be strictly positive to convert a capex in {self}"),
            });
        }
        let value = match self {
            CapexUnit::DollarPerKw => capex * 1000.0 / full_load_hours,
            CapexUnit::EuroPerKw => capex * euro_dollar * 1000.0 / full_load_hours,
            CapexUnit::DollarPerMw => capex / full_load_hours,
            CapexUnit::DollarPerKwh => capex * 1000.0,
            CapexUnit::DollarPerMwh => capex,
            CapexUnit::DollarPerTonne => capex,
            CapexUnit::DollarPerKg => capex * 1000.0,
        };
        Ok(value)
    }
}

impl FromStr for CapexUnit {
    type Err = RSTechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "$/kW" => Ok(CapexUnit::DollarPerKw),
            "euro/kW" => Ok(CapexUnit::EuroPerKw),
            "$/MW" => Ok(CapexUnit::DollarPerMw),
            "$/kWh" => Ok(CapexUnit::DollarPerKwh),
            "$/MWh" => Ok(CapexUnit::DollarPerMwh),
            "$/t" => Ok(CapexUnit::DollarPerTonne),
            "$/kg" => Ok(CapexUnit::DollarPerKg),
            other => Err(RSTechError::UnknownCapexUnit(other.to_string())),
        }
    }
}

impl fmt::Display for CapexUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CapexUnit::DollarPerKw => "$/kW",
            CapexUnit::EuroPerKw => "euro/kW",
            CapexUnit::DollarPerMw => "$/MW",
            CapexUnit::DollarPerKwh => "$/kWh",
            CapexUnit::DollarPerMwh => "$/MWh",
            CapexUnit::DollarPerTonne => "$/t",
            CapexUnit::DollarPerKg => "$/kg",
        };
        write!(f, "{s}")
    }
}

/// Units accepted for per-unit energy demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyDemandUnit {
    KwhPerKwh,
    MwhPerMwh,
    KwhPerKg,
    MwhPerTonne,
    KwhPerTonne,
    GjPerTonne,
}

impl EnergyDemandUnit {
    /// Convert a demand expressed in this unit to kWh/kg (or kWh/kWh).
    pub fn to_canonical(&self, demand: FloatValue) -> FloatValue {
        match self {
            EnergyDemandUnit::KwhPerKwh
            | EnergyDemandUnit::MwhPerMwh
            | EnergyDemandUnit::KwhPerKg
            | EnergyDemandUnit::MwhPerTonne => demand,
            EnergyDemandUnit::KwhPerTonne => demand / 1000.0,
            EnergyDemandUnit::GjPerTonne => demand * KWH_PER_GJ / 1000.0,
        }
    }
}

impl FromStr for EnergyDemandUnit {
    type Err = RSTechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kWh/kWh" => Ok(EnergyDemandUnit::KwhPerKwh),
            "MWh/MWh" => Ok(EnergyDemandUnit::MwhPerMwh),
            "kWh/kg" => Ok(EnergyDemandUnit::KwhPerKg),
            "MWh/t" => Ok(EnergyDemandUnit::MwhPerTonne),
            "kWh/t" => Ok(EnergyDemandUnit::KwhPerTonne),
            "GJ/t" => Ok(EnergyDemandUnit::GjPerTonne),
            other => Err(RSTechError::UnknownEnergyDemandUnit(other.to_string())),
        }
    }
}

/// Parse `unit` and normalise `demand` in one step.
pub fn normalise_energy_demand(demand: FloatValue, unit: &str) -> RSTechResult<FloatValue> {
    let unit: EnergyDemandUnit = unit.parse()?;
    Ok(unit.to_canonical(demand))
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn kw_capex_uses_full_load_hours() {
        let unit: CapexUnit = "$/kW".parse().unwrap();
        let capex = unit.to_canonical(1000.0, 8000.0, 1.1).unwrap();
        assert!(is_close!(capex, 125.0));
    }

    #[test]
    fn euro_capex_uses_exchange_rate() {
        let unit: CapexUnit = "euro/kW".parse().unwrap();
        let capex = unit.to_canonical(1000.0, 8000.0, 1.2).unwrap();
        assert!(is_close!(capex, 150.0));
    }

    #[test]
    fn mass_capex() {
        let per_kg: CapexUnit = "$/kg".parse().unwrap();
        let per_t: CapexUnit = "$/t".parse().unwrap();
        assert!(is_close!(
            per_kg.to_canonical(0.2, 0.0, 1.0).unwrap(),
            per_t.to_canonical(200.0, 0.0, 1.0).unwrap()
        ));
    }

    #[test]
    fn unknown_capex_unit_is_rejected() {
        let err = "$/acre".parse::<CapexUnit>().unwrap_err();
        assert!(matches!(err, RSTechError::UnknownCapexUnit(ref u) if u == "$/acre"));
    }

    #[test]
    fn zero_full_load_hours_is_rejected() {
        let unit = CapexUnit::DollarPerKw;
        assert!(unit.to_canonical(1000.0, 0.0, 1.0).is_err());
        // Not needed for energy based capex
        assert!(CapexUnit::DollarPerMwh
            .to_canonical(1000.0, 0.0, 1.0)
            .is_ok());
    }

    #[test]
    fn energy_demand_units() {
        assert!(is_close!(normalise_energy_demand(2.0, "kWh/kg").unwrap(), 2.0));
        assert!(is_close!(normalise_energy_demand(2000.0, "kWh/t").unwrap(), 2.0));
        assert!(is_close!(
            normalise_energy_demand(3.6, "GJ/t").unwrap(),
            3.6 * 0.27778
        ));
        assert!(matches!(
            normalise_energy_demand(1.0, "Wh/bbl"),
            Err(RSTechError::UnknownEnergyDemandUnit(_))
        ));
    }

    #[test]
    fn display_round_trip() {
        for unit in ["$/kW", "euro/kW", "$/MW", "$/kWh", "$/MWh", "$/t", "$/kg"] {
            let parsed: CapexUnit = unit.parse().unwrap();
            assert_eq!(parsed.to_string(), unit);
        }
    }
}
