//! Capex trajectory of newly built plants.
//!
//! Capex follows a learning curve on cumulative investment. The pre-existing fleet counts
//! as already invested capital, so that a technology with a large installed base learns
//! slowly from additional investment.
//!
//! # Algorithm
//!
//! With $e$ the learning exponent, $S_t$ the cumulative investment before year $t$
//! (seeded with the equivalent capital of the initial fleet) and $q_t$ the year-over-year
//! capacity factor ratio:
//!
//! 1. $c_0 = C_{init}$, and $c_t = C_{init}$ while $S_t$ is below a materiality floor
//! 2. $r_t = \left(\frac{S_t + I_t}{S_t} q_t\right)^{-e}$
//! 3. $c_t = c_{t-1} \cdot \mathrm{exp\_min}(r_t, 0.95)$
//! 4. $K_t = \rho C_{init} + (1 - \rho) c_t$ with $\rho$ = `maximum_learning_capex_ratio`
//!
//! The last step guarantees $K_t \geq \rho C_{init}$.

use crate::errors::RSTechResult;
use crate::parameters::TechnoParameters;
use crate::scalar::{FloatValue, Scalar};
use crate::utils::smoothing::{exp_min, exp_min_derivative};
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1};

/// Smallest year-over-year learning ratio before the exponential floor kicks in.
pub const CAPEX_RATIO_FLOOR: FloatValue = 0.95;

/// Resolved inputs of the capex recursion.
#[derive(Debug, Clone, PartialEq)]
pub struct CapexConfig {
    /// Capex of a new plant at `year_start`, in $/MWh or $/t
    pub capex_init: FloatValue,
    /// Learning exponent, zero disables learning
    pub expo_factor: FloatValue,
    /// Cumulative investment equivalent to the initial fleet
    pub initial_invest: FloatValue,
    /// Year-over-year capacity factor ratio
    pub capacity_factor_ratios: Array1<FloatValue>,
    pub maximum_learning_capex_ratio: FloatValue,
    pub min_cumulative_invest: FloatValue,
}

impl CapexConfig {
    /// Resolve the capex configuration of a technology.
    ///
    /// Fails on an unknown capex unit.
    pub fn from_parameters(
        parameters: &TechnoParameters,
        initial_production: FloatValue,
        n_years: usize,
    ) -> RSTechResult<Self> {
        let capex_init = parameters.capex_init_normalised()?;
        Ok(Self {
            capex_init,
            expo_factor: parameters.expo_factor(),
            initial_invest: initial_production * capex_init
                / parameters.invest_to_production_scaling,
            capacity_factor_ratios: parameters.capacity_factor_ratios(n_years),
            maximum_learning_capex_ratio: parameters.maximum_learning_capex_ratio,
            min_cumulative_invest: parameters.min_cumulative_invest,
        })
    }

    fn learns(&self) -> bool {
        self.expo_factor != 0.0
    }

    fn rescale<T: Scalar>(&self, raw: T) -> T {
        let ratio = self.maximum_learning_capex_ratio;
        T::real(ratio * self.capex_init) + T::real(1.0 - ratio) * raw
    }
}

/// One step of the learning recursion.
enum LearningStep<T> {
    /// Capex reset to its initial value
    Initial,
    /// Cumulative investment shrank to zero or below, capex is carried over
    Carried,
    /// Learning applied with the raw ratio `ratio` and cumulative investments before and
    /// after the year
    Learned { ratio: T, before: T, after: T },
}

fn learning_step<T: Scalar>(
    config: &CapexConfig,
    t: usize,
    cumulative: T,
    invest: T,
) -> LearningStep<T> {
    if t == 0 || cumulative.re() < config.min_cumulative_invest {
        return LearningStep::Initial;
    }
    let after = cumulative + invest;
    let growth = after / cumulative * T::real(config.capacity_factor_ratios[t]);
    if growth.re() <= 0.0 {
        return LearningStep::Carried;
    }
    LearningStep::Learned {
        ratio: growth.powf(-config.expo_factor),
        before: cumulative,
        after,
    }
}

/// Capex of a new plant for every simulated year.
///
/// Runs on any [`Scalar`] so that it can be differentiated with complex steps.
pub fn compute_capex<T: Scalar>(invest: ArrayView1<T>, config: &CapexConfig) -> Array1<T> {
    let capex_init = T::real(config.capex_init);
    if !config.learns() {
        return Array1::from_elem(invest.len(), capex_init);
    }

    let mut cumulative = T::real(config.initial_invest);
    let mut previous = capex_init;
    let mut capex = Array1::from_elem(invest.len(), capex_init);
    for (t, &inv) in invest.iter().enumerate() {
        let current = match learning_step(config, t, cumulative, inv) {
            LearningStep::Initial => {
                if t > 0 {
                    debug!(
                        "cumulative investment below materiality floor at index {t}, capex reset"
                    );
                }
                capex_init
            }
            LearningStep::Carried => {
                warn!("non-positive cumulative investment growth at index {t}, capex carried over");
                previous
            }
            LearningStep::Learned { ratio, .. } => previous * exp_min(ratio, CAPEX_RATIO_FLOOR),
        };
        capex[t] = config.rescale(current);
        previous = current;
        cumulative = cumulative + inv;
    }
    capex
}

/// Capex and its Jacobian with respect to the yearly investment.
///
/// The Jacobian is lower triangular: capex of year $t$ depends on the investment of
/// every year up to and including $t$.
pub fn capex_with_gradient(
    invest: ArrayView1<FloatValue>,
    config: &CapexConfig,
) -> (Array1<FloatValue>, Array2<FloatValue>) {
    let n = invest.len();
    let capex = compute_capex(invest, config);
    let mut gradient = Array2::zeros((n, n));
    if !config.learns() {
        return (capex, gradient);
    }

    let scale = 1.0 - config.maximum_learning_capex_ratio;
    let e = config.expo_factor;
    let mut cumulative = config.initial_invest;
    let mut previous = config.capex_init;
    let mut d_previous: Array1<FloatValue> = Array1::zeros(n);
    for t in 0..n {
        let (current, d_current) = match learning_step(config, t, cumulative, invest[t]) {
            LearningStep::Initial => (config.capex_init, Array1::zeros(n)),
            LearningStep::Carried => (previous, d_previous.clone()),
            LearningStep::Learned {
                ratio,
                before,
                after,
            } => {
                let floored = exp_min(ratio, CAPEX_RATIO_FLOOR);
                let d_floored = exp_min_derivative(ratio, CAPEX_RATIO_FLOOR);
                let mut d_current = Array1::zeros(n);
                for j in 0..=t {
                    // d ln(after) / dI_j - d ln(before) / dI_j
                    let d_log_growth = 1.0 / after - if j < t { 1.0 / before } else { 0.0 };
                    let d_ratio = -e * ratio * d_log_growth;
                    d_current[j] = floored * d_previous[j] + previous * d_floored * d_ratio;
                }
                (previous * floored, d_current)
            }
        };
        gradient
            .row_mut(t)
            .assign(&d_current.mapv(|d| d * scale));
        previous = current;
        d_previous = d_current;
        cumulative += invest[t];
    }
    (capex, gradient)
}
