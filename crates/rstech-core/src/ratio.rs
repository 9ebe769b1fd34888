//! Production ratio applied when consumed streams are in short supply.
//!
//! The energy mix reports, per stream, the percentage of the demand it can serve. A
//! technology can only produce as much as its scarcest input allows, so the applied ratio
//! is a soft minimum of the demand ratios of the streams it consumes.

use crate::scalar::{FloatValue, Scalar};
use crate::utils::smoothing::{argmin, smooth_minimum, smooth_minimum_gradient};
use ndarray::Array1;
use std::collections::BTreeMap;

/// Applied ratio for every simulated year.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRatio<T> {
    /// Fraction of the production actually delivered, between 0 and 1
    pub values: Array1<T>,
    /// Stream with the smallest demand ratio, `None` when no ratio applies
    pub limiting_input: Vec<Option<String>>,
}

/// Soft minimum of the demand ratios of the consumed streams.
///
/// `demand_ratios` are in percent. Consumed streams without a ratio are ignored and the
/// applied ratio is 1 when none is supplied.
pub fn applied_ratio<'a, T: Scalar>(
    consumed_streams: impl IntoIterator<Item = &'a str>,
    demand_ratios: &BTreeMap<String, Array1<T>>,
    n_years: usize,
    smoothing: FloatValue,
) -> AppliedRatio<T> {
    let limiting: Vec<(&String, &Array1<T>)> = consumed_streams
        .into_iter()
        .filter_map(|stream| demand_ratios.get_key_value(stream))
        .collect();
    if limiting.is_empty() {
        return AppliedRatio {
            values: Array1::from_elem(n_years, T::one()),
            limiting_input: vec![None; n_years],
        };
    }

    let hundred = T::real(100.0);
    let mut values = Array1::from_elem(n_years, T::one());
    let mut limiting_input = Vec::with_capacity(n_years);
    for t in 0..n_years {
        let ratios: Vec<T> = limiting.iter().map(|(_, r)| r[t] / hundred).collect();
        values[t] = smooth_minimum(&ratios, smoothing);
        limiting_input.push(argmin(&ratios).map(|i| limiting[i].0.clone()));
    }
    AppliedRatio {
        values,
        limiting_input,
    }
}

/// Diagonal of the applied ratio Jacobian with respect to the demand ratio of `stream`.
///
/// Zero when `stream` does not limit this technology.
pub fn applied_ratio_gradient<'a>(
    consumed_streams: impl IntoIterator<Item = &'a str>,
    demand_ratios: &BTreeMap<String, Array1<FloatValue>>,
    stream: &str,
    n_years: usize,
    smoothing: FloatValue,
) -> Array1<FloatValue> {
    let limiting: Vec<(&String, &Array1<FloatValue>)> = consumed_streams
        .into_iter()
        .filter_map(|s| demand_ratios.get_key_value(s))
        .collect();
    let Some(position) = limiting.iter().position(|(name, _)| name.as_str() == stream) else {
        return Array1::zeros(n_years);
    };
    (0..n_years)
        .map(|t| {
            let ratios: Vec<FloatValue> = limiting.iter().map(|(_, r)| r[t] / 100.0).collect();
            smooth_minimum_gradient(&ratios, smoothing)[position] / 100.0
        })
        .collect()
}
