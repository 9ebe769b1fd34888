//! Techno-economic parameters shared by every technology.
//!
//! The serialised names follow the keys of the host platform's `techno_infos_dict`
//! (`Capex_init`, `Opex_percentage`, `WACC`, ...), so a parameter bag exported by the
//! host can be read as-is.

use crate::errors::{RSTechError, RSTechResult};
use crate::scalar::FloatValue;
use crate::units::CapexUnit;
use crate::utils::smoothing::s_curve;
use crate::years::YearRange;
use ndarray::Array1;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Logistic ramp of the conversion efficiency over time.
///
/// $$ \eta(t) = \eta_0 + (\eta_{max} - \eta_0) \, \sigma(k (t - t_{mid})) $$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyEvolution {
    /// Asymptotic efficiency reached by the mature technology
    /// unit: dimensionless
    pub efficiency_max: FloatValue,

    /// Year at which half of the improvement is achieved
    pub mid_year: FloatValue,

    /// Steepness of the ramp
    /// unit: yr⁻¹
    /// default: 0.3
    #[serde(default = "default_evolution_slope")]
    pub slope: FloatValue,
}

fn default_evolution_slope() -> FloatValue {
    0.3
}

/// Parameters of a technology.
///
/// Set once when a technology is configured and never mutated by an evaluation.
/// Every model owns its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnoParameters {
    /// Capital cost of a new plant, in `capex_init_unit`
    #[serde(rename = "Capex_init")]
    pub capex_init: FloatValue,

    /// Unit of `capex_init`, see [`CapexUnit`]
    /// default: "$/MWh"
    #[serde(rename = "Capex_init_unit")]
    pub capex_init_unit: String,

    /// Yearly operating cost as a fraction of capex
    /// unit: dimensionless
    #[serde(rename = "Opex_percentage")]
    pub opex_percentage: FloatValue,

    /// Weighted average cost of capital used to annuitise capex
    /// unit: dimensionless
    /// default: 0.058
    #[serde(rename = "WACC")]
    pub wacc: FloatValue,

    /// Relative capex reduction for each doubling of cumulative investment
    pub learning_rate: Option<FloatValue>,

    /// Learning-curve exponent. Takes precedence over `learning_rate` when set.
    pub expo_factor: Option<FloatValue>,

    /// Capex can never fall below this fraction of `capex_init`
    /// default: 0.9
    pub maximum_learning_capex_ratio: FloatValue,

    /// Plant lifetime
    /// unit: yr
    /// default: 25
    pub lifetime: u32,

    /// Years between an investment and the start of the corresponding production
    /// unit: yr
    /// default: 3
    pub construction_delay: u32,

    /// Conversion efficiency of the process
    /// default: 1.0
    pub efficiency: FloatValue,

    /// Optional time ramp of `efficiency`
    pub efficiency_evolution: Option<EfficiencyEvolution>,

    /// Yearly hours at full load, used for kW based capex and installed capacity
    /// unit: h
    /// default: 8760
    pub full_load_hours: FloatValue,

    /// Exchange rate for euro denominated capex
    /// unit: $/euro
    /// default: 1.114
    pub euro_dollar: FloatValue,

    /// Capacity factor at `year_start`
    pub capacity_factor: Option<FloatValue>,

    /// Capacity factor reached at `year_end`, linearly interpolated in between
    pub capacity_factor_at_year_end: Option<FloatValue>,

    /// Direct CO2 emitted by the process per unit of product
    /// unit: kg/kWh (or kg/kg for mass products)
    #[serde(rename = "CO2_from_production")]
    pub co2_from_production: FloatValue,

    /// Production bought by one unit of investment at a capex of one.
    ///
    /// 1e3 converts G$ at $/MWh into TWh, and G$ at $/t into Mt.
    /// default: 1000
    pub invest_to_production_scaling: FloatValue,

    /// Cumulative investment below which learning is not applied
    /// unit: same as investment (1e-3 G$ = 1 M$)
    /// default: 1e-3
    pub min_cumulative_invest: FloatValue,

    /// Divisor converting the transport cost input to a cost per unit of product
    /// (e.g. calorific value for $/t transported fuels)
    /// default: 1.0
    pub transport_conversion: FloatValue,

    /// Land occupied per unit of production
    /// unit: Gha/TWh
    pub land_use_per_production: Option<FloatValue>,

    /// Sharpness of the soft minimum over stream demand ratios
    /// default: 100
    pub demand_ratio_smoothing: FloatValue,
}

impl Default for TechnoParameters {
    fn default() -> Self {
        Self {
            capex_init: 0.0,
            capex_init_unit: "$/MWh".to_string(),
            opex_percentage: 0.0,
            wacc: 0.058,
            learning_rate: None,
            expo_factor: None,
            maximum_learning_capex_ratio: 0.9,
            lifetime: 25,
            construction_delay: 3,
            efficiency: 1.0,
            efficiency_evolution: None,
            full_load_hours: 8760.0,
            euro_dollar: 1.114,
            capacity_factor: None,
            capacity_factor_at_year_end: None,
            co2_from_production: 0.0,
            invest_to_production_scaling: 1.0e3,
            min_cumulative_invest: 1.0e-3,
            transport_conversion: 1.0,
            land_use_per_production: None,
            demand_ratio_smoothing: 100.0,
        }
    }
}

impl TechnoParameters {
    /// Parse and validate parameters from a TOML document.
    pub fn from_toml_str(source: &str) -> RSTechResult<Self> {
        let parameters: Self = toml::from_str(source)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Check the parameters for values no evaluation could make sense of.
    ///
    /// The capex unit is checked here so that a misconfigured technology fails when it is
    /// configured rather than on its first evaluation.
    pub fn validate(&self) -> RSTechResult<()> {
        self.capex_unit()?;
        if let Some(lr) = self.learning_rate {
            if !(0.0..1.0).contains(&lr) {
                return Err(invalid("learning_rate", format!("{lr} is not in [0, 1)")));
            }
        }
        if !(0.0..=1.0).contains(&self.maximum_learning_capex_ratio) {
            return Err(invalid(
                "maximum_learning_capex_ratio",
                format!("{} is not in [0, 1]", self.maximum_learning_capex_ratio),
            ));
        }
        if self.wacc <= -1.0 {
            return Err(invalid("WACC", format!("{} must be above -1", self.wacc)));
        }
        if self.full_load_hours <= 0.0 {
            return Err(invalid("full_load_hours", "must be strictly positive".to_string()));
        }
        if self.invest_to_production_scaling <= 0.0 {
            return Err(invalid(
                "invest_to_production_scaling",
                "must be strictly positive".to_string(),
            ));
        }
        if self.transport_conversion == 0.0 {
            return Err(invalid("transport_conversion", "must not be zero".to_string()));
        }
        if self.demand_ratio_smoothing <= 0.0 {
            return Err(invalid(
                "demand_ratio_smoothing",
                "must be strictly positive".to_string(),
            ));
        }
        match (self.capacity_factor, self.capacity_factor_at_year_end) {
            (Some(cf), _) if cf <= 0.0 => {
                return Err(invalid("capacity_factor", "must be strictly positive".to_string()))
            }
            (_, Some(cf)) if cf <= 0.0 => {
                return Err(invalid(
                    "capacity_factor_at_year_end",
                    "must be strictly positive".to_string(),
                ))
            }
            _ => {}
        }
        Ok(())
    }

    pub fn capex_unit(&self) -> RSTechResult<CapexUnit> {
        self.capex_init_unit.parse()
    }

    /// `capex_init` converted to $/MWh (or $/t) of yearly production.
    pub fn capex_init_normalised(&self) -> RSTechResult<FloatValue> {
        self.capex_unit()?
            .to_canonical(self.capex_init, self.full_load_hours, self.euro_dollar)
    }

    /// Learning-curve exponent.
    ///
    /// Derived from the learning rate as $-\log_2(1 - lr)$ so that doubling the
    /// cumulative investment multiplies capex by $1 - lr$. Zero when neither is set.
    pub fn expo_factor(&self) -> FloatValue {
        match (self.expo_factor, self.learning_rate) {
            (Some(expo), _) => expo,
            (None, Some(lr)) => -(1.0 - lr).log2(),
            (None, None) => 0.0,
        }
    }

    /// Capital recovery factor
    ///
    /// $$ CRF = \frac{r (1 + r)^n}{(1 + r)^n - 1} $$
    ///
    /// with $r$ the WACC and $n$ the lifetime. Falls back to $1/n$ without discounting
    /// and to 1 for a zero lifetime.
    pub fn capital_recovery_factor(&self) -> FloatValue {
        let n = self.lifetime as FloatValue;
        let r = self.wacc;
        if self.lifetime == 0 {
            1.0
        } else if r.abs() < 1e-10 {
            1.0 / n
        } else {
            r * (1.0 + r).powf(n) / ((1.0 + r).powf(n) - 1.0)
        }
    }

    /// Efficiency for every simulated year.
    pub fn efficiency_series(&self, years: &YearRange) -> Array1<FloatValue> {
        match &self.efficiency_evolution {
            Some(evolution) => years
                .iter()
                .map(|year| {
                    s_curve(
                        year as FloatValue,
                        self.efficiency,
                        evolution.efficiency_max,
                        evolution.slope,
                        evolution.mid_year,
                    )
                })
                .collect(),
            None => Array1::from_elem(years.len(), self.efficiency),
        }
    }

    /// Year-over-year capacity factor ratio, 1 when no capacity factor trajectory is set.
    ///
    /// The capacity factor is interpolated linearly from `capacity_factor` at the first
    /// year to `capacity_factor_at_year_end` at the last.
    pub fn capacity_factor_ratios(&self, n_years: usize) -> Array1<FloatValue> {
        match (self.capacity_factor, self.capacity_factor_at_year_end) {
            (Some(start), Some(end)) if n_years > 1 => {
                let factors = Array1::linspace(start, end, n_years);
                let mut ratios = Array1::ones(n_years);
                for t in 1..n_years {
                    ratios[t] = factors[t] / factors[t - 1];
                }
                ratios
            }
            _ => Array1::ones(n_years),
        }
    }
}

/// Parse a TOML document on top of `defaults`.
///
/// Top-level keys present in the document replace the default values, absent keys keep
/// them. Parameter structs flattening [`TechnoParameters`] use this so that a partial
/// document keeps the technology's own defaults rather than the generic ones.
pub fn overlay_toml<P: Serialize + DeserializeOwned>(
    defaults: &P,
    source: &str,
) -> RSTechResult<P> {
    let mut merged = match toml::Value::try_from(defaults) {
        Ok(toml::Value::Table(table)) => table,
        Ok(other) => {
            return Err(RSTechError::Error(format!(
                "defaults serialise to a {}, not a table",
                other.type_str()
            )))
        }
        Err(e) => return Err(RSTechError::Error(format!("could not serialise defaults: {e}"))),
    };
    let overrides: toml::Table = toml::from_str(source)?;
    merged.extend(overrides);
    Ok(toml::Value::Table(merged).try_into()?)
}

fn invalid(name: &str, reason: String) -> RSTechError {
    RSTechError::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}
