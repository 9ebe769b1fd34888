//! Investment to production conversion and fleet aging.
//!
//! A plant financed in year $t$ starts producing in year $t + d$, with $d$ the construction
//! delay. The yearly production it adds is the investment divided by the capex of year $t$:
//!
//! $$ P^{new}_{t+d} = \frac{I_t \, s}{K_t} $$
//!
//! with $s$ the invest-to-production scaling. Productions commissioned in the first $d$
//! simulated years come from the investment made before `year_start`, priced at the
//! capex of the first year.
//!
//! Each commissioning year forms a cohort that ages by one year per simulated year and
//! retires when its age reaches the lifetime. The fleet installed before `year_start`
//! is split into cohorts following the initial age distribution and ages the same way.

use crate::errors::{RSTechError, RSTechResult};
use crate::parameters::TechnoParameters;
use crate::scalar::{FloatValue, Scalar, Year};
use crate::variables;
use crate::years::YearRange;
use log::warn;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Share of the initial fleet at a given age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeShare {
    /// unit: yr
    pub age: u32,
    /// Percentage of `initial_production`
    pub distrib: FloatValue,
}

/// Age histogram of the fleet installed before `year_start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitialAgeDistribution {
    shares: Vec<AgeShare>,
}

impl InitialAgeDistribution {
    pub fn new(shares: Vec<AgeShare>) -> Self {
        Self { shares }
    }

    /// Build a distribution from `(age, percentage)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, FloatValue)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(age, distrib)| AgeShare { age, distrib })
                .collect(),
        )
    }

    /// Same share for every age in `[0, max_age)`.
    pub fn uniform(max_age: u32) -> Self {
        if max_age == 0 {
            return Self::default();
        }
        let share = 100.0 / max_age as FloatValue;
        Self::from_pairs((0..max_age).map(|age| (age, share)))
    }

    pub fn shares(&self) -> &[AgeShare] {
        &self.shares
    }

    pub fn total_percentage(&self) -> FloatValue {
        self.shares.iter().map(|s| s.distrib).sum()
    }

    /// Shares of the cohorts still alive for the given lifetime.
    ///
    /// Ages at or beyond the lifetime are dropped with a warning.
    pub fn live_shares(&self, lifetime: u32) -> Vec<AgeShare> {
        let (live, dead): (Vec<AgeShare>, Vec<AgeShare>) =
            self.shares.iter().copied().partition(|s| s.age < lifetime);
        if !dead.is_empty() {
            let dropped: FloatValue = dead.iter().map(|s| s.distrib).sum();
            warn!(
                "initial age distribution has {} ages at or beyond lifetime {lifetime}, \
                 dropping {dropped}% of the initial fleet",
                dead.len()
            );
        }
        let total = self.total_percentage();
        if !self.shares.is_empty() && (total - 100.0).abs() > 1e-3 {
            warn!("initial age distribution sums to {total}%, not 100%");
        }
        live
    }
}

/// Where a cohort of plants comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CohortOrigin {
    InitialFleet,
    NewBuild { commissioning_year: Year },
}

/// Production of one cohort in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeCohortRow<T> {
    pub year: Year,
    /// unit: yr
    pub age: u32,
    pub production: T,
    pub origin: CohortOrigin,
}

/// Production by `(year, age)` of every live cohort.
///
/// Rows contributing exactly zero are not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeDistributionTable<T> {
    years: YearRange,
    rows: Vec<AgeCohortRow<T>>,
}

impl<T: Scalar> AgeDistributionTable<T> {
    pub fn years(&self) -> &YearRange {
        &self.years
    }

    pub fn rows(&self) -> &[AgeCohortRow<T>] {
        &self.rows
    }

    pub fn rows_in(&self, year: Year) -> impl Iterator<Item = &AgeCohortRow<T>> {
        self.rows.iter().filter(move |r| r.year == year)
    }

    /// Total production of the live fleet for every year
    pub fn production_by_year(&self) -> Array1<T> {
        let mut total = Array1::from_elem(self.years.len(), T::zero());
        for row in &self.rows {
            if let Some(i) = self.years.index_of(row.year) {
                total[i] = total[i] + row.production;
            }
        }
        total
    }

    /// Production weighted mean age of the live fleet.
    ///
    /// Years without production, or with a non-finite mean, resolve to zero.
    pub fn mean_age_over_years(&self) -> Array1<T> {
        let n = self.years.len();
        let mut weighted = Array1::from_elem(n, T::zero());
        let mut total = Array1::from_elem(n, T::zero());
        for row in &self.rows {
            if let Some(i) = self.years.index_of(row.year) {
                weighted[i] = weighted[i] + T::real(row.age as FloatValue) * row.production;
                total[i] = total[i] + row.production;
            }
        }
        let mut mean = Array1::from_elem(n, T::zero());
        for i in 0..n {
            if total[i].re() != 0.0 {
                let value = weighted[i] / total[i];
                if value.re().is_finite() {
                    mean[i] = value;
                }
            }
        }
        mean
    }
}

/// Fleet description shared by the production computations.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetModel {
    pub lifetime: u32,
    pub construction_delay: u32,
    pub invest_to_production_scaling: FloatValue,
    /// Production of the fleet installed before `year_start`
    pub initial_production: FloatValue,
    /// Live shares of the initial fleet
    initial_shares: Vec<AgeShare>,
}

impl FleetModel {
    pub fn new(
        lifetime: u32,
        construction_delay: u32,
        invest_to_production_scaling: FloatValue,
        initial_production: FloatValue,
        initial_age_distribution: &InitialAgeDistribution,
    ) -> Self {
        Self {
            lifetime,
            construction_delay,
            invest_to_production_scaling,
            initial_production,
            initial_shares: initial_age_distribution.live_shares(lifetime),
        }
    }

    pub fn from_parameters(
        parameters: &TechnoParameters,
        initial_production: FloatValue,
        initial_age_distribution: &InitialAgeDistribution,
    ) -> Self {
        Self::new(
            parameters.lifetime,
            parameters.construction_delay,
            parameters.invest_to_production_scaling,
            initial_production,
            initial_age_distribution,
        )
    }

    fn delay(&self) -> usize {
        self.construction_delay as usize
    }

    fn is_alive(&self, age: usize) -> bool {
        age < self.lifetime as usize
    }

    fn check_invest_before_start(&self, got: usize) -> RSTechResult<()> {
        if got != self.delay() {
            return Err(RSTechError::LengthMismatch {
                variable: variables::INVEST_BEFORE_YEAR_START.to_string(),
                expected: self.delay(),
                got,
            });
        }
        Ok(())
    }

    /// Production added each year by newly commissioned plants.
    ///
    /// `invest_before_start` holds the investment of the `construction_delay` years
    /// preceding `year_start`, oldest first.
    pub fn production_from_invest<T: Scalar>(
        &self,
        invest: ArrayView1<T>,
        invest_before_start: ArrayView1<T>,
        capex: ArrayView1<T>,
    ) -> RSTechResult<Array1<T>> {
        self.check_invest_before_start(invest_before_start.len())?;
        let n = invest.len();
        let d = self.delay();
        let scaling = T::real(self.invest_to_production_scaling);
        let mut production = Array1::from_elem(n, T::zero());
        for y in 0..n {
            production[y] = if y < d {
                invest_before_start[y] * scaling / capex[0]
            } else {
                invest[y - d] * scaling / capex[y - d]
            };
        }
        Ok(production)
    }

    /// Jacobian of [`Self::production_from_invest`] with respect to the investment.
    ///
    /// `capex_gradient` is the Jacobian of the capex with respect to the same investment.
    pub fn production_from_invest_gradient(
        &self,
        invest: ArrayView1<FloatValue>,
        invest_before_start: ArrayView1<FloatValue>,
        capex: ArrayView1<FloatValue>,
        capex_gradient: ArrayView2<FloatValue>,
    ) -> RSTechResult<Array2<FloatValue>> {
        self.check_invest_before_start(invest_before_start.len())?;
        let n = invest.len();
        let d = self.delay();
        let s = self.invest_to_production_scaling;
        let mut gradient = Array2::zeros((n, n));
        for y in 0..n {
            let (amount, k) = if y < d {
                (invest_before_start[y], 0)
            } else {
                (invest[y - d], y - d)
            };
            let factor = -amount * s / (capex[k] * capex[k]);
            let mut row = capex_gradient.row(k).mapv(|g| g * factor);
            if y >= d {
                row[k] += s / capex[k];
            }
            gradient.row_mut(y).assign(&row);
        }
        Ok(gradient)
    }

    /// Remaining production of the initial fleet for each of `n_years` years
    pub fn initial_fleet_production<T: Scalar>(&self, n_years: usize) -> Array1<T> {
        let mut remaining = Array1::from_elem(n_years, T::zero());
        for share in &self.initial_shares {
            let contribution = T::real(share.distrib / 100.0 * self.initial_production);
            for (y, value) in remaining.iter_mut().enumerate() {
                if self.is_alive(share.age as usize + y) {
                    *value = *value + contribution;
                }
            }
        }
        remaining
    }

    /// Age distribution of the production over the simulated years.
    pub fn age_distribution<T: Scalar>(
        &self,
        years: &YearRange,
        new_production: ArrayView1<T>,
    ) -> AgeDistributionTable<T> {
        let mut rows = Vec::new();
        for (y, year) in years.iter().enumerate() {
            for share in &self.initial_shares {
                let age = share.age as usize + y;
                if !self.is_alive(age) {
                    continue;
                }
                let production = T::real(share.distrib / 100.0 * self.initial_production);
                if !production.is_zero() {
                    rows.push(AgeCohortRow {
                        year,
                        age: age as u32,
                        production,
                        origin: CohortOrigin::InitialFleet,
                    });
                }
            }
            for c in 0..=y {
                let age = y - c;
                if !self.is_alive(age) || new_production[c].is_zero() {
                    continue;
                }
                rows.push(AgeCohortRow {
                    year,
                    age: age as u32,
                    production: new_production[c],
                    origin: CohortOrigin::NewBuild {
                        commissioning_year: years.year_start() + c as Year,
                    },
                });
            }
        }
        AgeDistributionTable {
            years: *years,
            rows,
        }
    }

    /// Production of the live fleet before any demand or utilisation ratio is applied.
    pub fn production_without_ratio<T: Scalar>(&self, new_production: ArrayView1<T>) -> Array1<T> {
        let n = new_production.len();
        let mut production = self.initial_fleet_production::<T>(n);
        for y in 0..n {
            for c in self.first_live_cohort(y)..=y {
                production[y] = production[y] + new_production[c];
            }
        }
        production
    }

    /// Jacobian of [`Self::production_without_ratio`] given the Jacobian of the new production.
    pub fn production_without_ratio_gradient(
        &self,
        new_production_gradient: ArrayView2<FloatValue>,
    ) -> Array2<FloatValue> {
        let (n, m) = new_production_gradient.dim();
        let mut gradient = Array2::zeros((n, m));
        for y in 0..n {
            let mut row = gradient.row_mut(y);
            for c in self.first_live_cohort(y)..=y {
                row += &new_production_gradient.row(c);
            }
        }
        gradient
    }

    /// Production lost each year through retirement.
    pub fn retired_production<T: Scalar>(&self, new_production: ArrayView1<T>) -> Array1<T> {
        let n = new_production.len();
        let lifetime = self.lifetime as usize;
        let mut retired = Array1::from_elem(n, T::zero());
        for y in 1..n {
            if lifetime > 0 && y >= lifetime {
                retired[y] = retired[y] + new_production[y - lifetime];
            }
            for share in &self.initial_shares {
                if share.age as usize + y == lifetime {
                    retired[y] =
                        retired[y] + T::real(share.distrib / 100.0 * self.initial_production);
                }
            }
        }
        retired
    }

    /// Jacobian of the mean age with respect to the investment.
    ///
    /// Only new cohorts depend on the investment, the initial fleet enters through the
    /// totals.
    pub fn mean_age_gradient(
        &self,
        new_production: ArrayView1<FloatValue>,
        new_production_gradient: ArrayView2<FloatValue>,
    ) -> Array2<FloatValue> {
        let (n, m) = new_production_gradient.dim();
        let initial = self.initial_fleet_production::<FloatValue>(n);
        let mut initial_weighted = Array1::<FloatValue>::zeros(n);
        for share in &self.initial_shares {
            for (y, value) in initial_weighted.iter_mut().enumerate() {
                let age = share.age as usize + y;
                if self.is_alive(age) {
                    *value += age as FloatValue * share.distrib / 100.0 * self.initial_production;
                }
            }
        }

        let mut gradient = Array2::zeros((n, m));
        for y in 0..n {
            let mut total = initial[y];
            let mut weighted = initial_weighted[y];
            let mut d_total = Array1::<FloatValue>::zeros(m);
            let mut d_weighted = Array1::<FloatValue>::zeros(m);
            for c in self.first_live_cohort(y)..=y {
                let age = (y - c) as FloatValue;
                total += new_production[c];
                weighted += age * new_production[c];
                d_total += &new_production_gradient.row(c);
                d_weighted.scaled_add(age, &new_production_gradient.row(c));
            }
            if total == 0.0 || !(weighted / total).is_finite() {
                continue;
            }
            let row = (d_weighted * total - d_total * weighted) / (total * total);
            gradient.row_mut(y).assign(&row);
        }
        gradient
    }

    fn first_live_cohort(&self, y: usize) -> usize {
        let lifetime = self.lifetime as usize;
        if lifetime == 0 {
            y + 1
        } else {
            (y + 1).saturating_sub(lifetime)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradients::complex_step;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num::complex::Complex64;

    fn years(n: i32) -> YearRange {
        YearRange::new(2020, 2020 + n - 1).unwrap()
    }

    fn fleet(lifetime: u32, delay: u32) -> FleetModel {
        FleetModel::new(
            lifetime,
            delay,
            1000.0,
            100.0,
            &InitialAgeDistribution::from_pairs([(0, 50.0), (2, 30.0), (4, 20.0)]),
        )
    }

    // ===== Production from investment =====

    #[test]
    fn construction_delay_shifts_production() {
        let fleet = fleet(10, 2);
        let invest = array![1.0, 2.0, 3.0, 4.0];
        let before = array![0.5, 0.7];
        let capex = array![100.0, 90.0, 80.0, 70.0];
        let new = fleet
            .production_from_invest(invest.view(), before.view(), capex.view())
            .unwrap();
        assert_relative_eq!(new[0], 0.5 * 1000.0 / 100.0);
        assert_relative_eq!(new[1], 0.7 * 1000.0 / 100.0);
        assert_relative_eq!(new[2], 1.0 * 1000.0 / 100.0);
        assert_relative_eq!(new[3], 2.0 * 1000.0 / 90.0);
    }

    #[test]
    fn invest_before_start_length_is_checked() {
        let fleet = fleet(10, 3);
        let invest = array![1.0, 2.0, 3.0, 4.0];
        let capex = array![100.0, 90.0, 80.0, 70.0];
        let result = fleet.production_from_invest(invest.view(), array![1.0].view(), capex.view());
        assert!(matches!(
            result,
            Err(RSTechError::LengthMismatch { expected: 3, got: 1, .. })
        ));
    }

    #[test]
    fn no_delay_uses_same_year_investment() {
        let fleet = fleet(10, 0);
        let invest = array![1.0, 2.0];
        let capex = array![10.0, 20.0];
        let new = fleet
            .production_from_invest(invest.view(), Array1::zeros(0).view(), capex.view())
            .unwrap();
        assert_eq!(new.to_vec(), vec![100.0, 100.0]);
    }

    // ===== Aging =====

    #[test]
    fn initial_cohorts_retire_at_lifetime() {
        let fleet = FleetModel::new(
            25,
            3,
            1000.0,
            100.0,
            &InitialAgeDistribution::from_pairs([(24, 40.0), (10, 60.0)]),
        );
        let years = years(3);
        let table = fleet.age_distribution(&years, Array1::<f64>::zeros(3).view());
        let first: Vec<_> = table.rows_in(2020).collect();
        assert_eq!(first.len(), 2);
        assert!(table.rows_in(2021).all(|r| r.age < 25));
        assert_eq!(table.rows_in(2021).count(), 1);
        assert_relative_eq!(table.production_by_year()[1], 60.0);
    }

    #[test]
    fn ages_beyond_lifetime_are_dropped() {
        let distribution = InitialAgeDistribution::from_pairs([(3, 50.0), (30, 50.0)]);
        let fleet = FleetModel::new(25, 3, 1000.0, 100.0, &distribution);
        let remaining = fleet.initial_fleet_production::<f64>(1);
        assert_relative_eq!(remaining[0], 50.0);
    }

    #[test]
    fn new_cohorts_age_and_retire() {
        let fleet = FleetModel::new(3, 0, 1000.0, 0.0, &InitialAgeDistribution::default());
        let years = years(6);
        let new = array![1.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        let table = fleet.age_distribution(&years, new.view());
        let production = table.production_by_year();
        assert_eq!(production.to_vec(), vec![1.0, 1.0, 1.0, 0.0, 2.0, 2.0]);
        assert_eq!(production, fleet.production_without_ratio(new.view()));
        let ages: Vec<u32> = table.rows_in(2022).map(|r| r.age).collect();
        assert_eq!(ages, vec![2]);
        assert_eq!(
            table.rows_in(2022).next().map(|r| r.origin),
            Some(CohortOrigin::NewBuild {
                commissioning_year: 2020
            })
        );
        assert_eq!(
            fleet.retired_production(new.view()).to_vec(),
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn zero_lifetime_produces_nothing() {
        let fleet = fleet(0, 1);
        let new = array![5.0, 5.0];
        assert_eq!(fleet.production_without_ratio(new.view()).to_vec(), vec![0.0, 0.0]);
        let table = fleet.age_distribution(&years(2), new.view());
        assert!(table.rows().is_empty());
        assert_eq!(table.mean_age_over_years().to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn production_is_non_negative() {
        let fleet = fleet(5, 1);
        let invest = Array1::linspace(0.0, 3.0, 12);
        let capex = Array1::from_elem(12, 50.0);
        let new = fleet
            .production_from_invest(invest.view(), array![0.0].view(), capex.view())
            .unwrap();
        assert!(fleet.production_without_ratio(new.view()).iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn mean_age_is_bounded() {
        let fleet = fleet(8, 1);
        let years = years(20);
        let new = Array1::linspace(0.0, 4.0, 20);
        let mean = fleet.age_distribution(&years, new.view()).mean_age_over_years();
        assert!(mean.iter().all(|&a| (0.0..8.0).contains(&a)));
    }

    #[test]
    fn zero_rows_are_pruned_but_complex_perturbations_are_kept() {
        let fleet = FleetModel::new(5, 0, 1000.0, 0.0, &InitialAgeDistribution::default());
        let new = array![Complex64::new(0.0, 1e-30), Complex64::new(0.0, 0.0)];
        let table = fleet.age_distribution(&years(2), new.view());
        assert_eq!(table.rows().len(), 2);
    }

    // ===== Gradients =====

    #[test]
    fn production_gradients_match_complex_step() {
        let fleet = fleet(4, 2);
        let n = 9;
        let invest = Array1::linspace(1.0, 3.0, n);
        let before = array![0.5, 0.8];
        // Capex depending on cumulative investment couples the years
        let capex_of = |x: ArrayView1<Complex64>| {
            let mut cumulative = Complex64::new(10.0, 0.0);
            x.mapv(|v| {
                cumulative += v;
                Complex64::new(1000.0, 0.0) / cumulative.sqrt()
            })
        };
        let capex_c = capex_of(invest.mapv(|v| Complex64::new(v, 0.0)).view());
        let capex = capex_c.mapv(|c| c.re);
        let capex_gradient = complex_step(invest.view(), capex_of);

        let d_new = fleet
            .production_from_invest_gradient(
                invest.view(),
                before.view(),
                capex.view(),
                capex_gradient.view(),
            )
            .unwrap();
        let new = fleet
            .production_from_invest(invest.view(), before.view(), capex.view())
            .unwrap();
        let before_c = before.mapv(|v| Complex64::new(v, 0.0));
        let new_of = |x: ArrayView1<Complex64>| {
            let capex = capex_of(x);
            fleet
                .production_from_invest(x, before_c.view(), capex.view())
                .unwrap()
        };
        let expected = complex_step(invest.view(), new_of);
        for (a, b) in d_new.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-5, epsilon = 1e-12);
        }

        let d_total = fleet.production_without_ratio_gradient(d_new.view());
        let expected = complex_step(invest.view(), |x| {
            fleet.production_without_ratio(new_of(x).view())
        });
        for (a, b) in d_total.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-5, epsilon = 1e-12);
        }

        let years = years(n as i32);
        let d_age = fleet.mean_age_gradient(new.view(), d_new.view());
        let expected = complex_step(invest.view(), |x| {
            fleet.age_distribution(&years, new_of(x).view()).mean_age_over_years()
        });
        for (a, b) in d_age.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-5, epsilon = 1e-12);
        }
    }
}
