//! Smooth replacements for non-differentiable functions.
//!
//! The host optimiser is gradient based, so floors, ceilings and minima that would
//! otherwise introduce kinks are expressed with exponential blends instead.

use crate::scalar::{FloatValue, Scalar};

/// Logistic function $\sigma(x) = 1 / (1 + e^{-x})$.
pub fn sigmoid<T: Scalar>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// Logistic S-curve between `start` and `end`.
///
/// $$ f(x) = start + (end - start) \cdot \sigma(slope \cdot (x - midpoint)) $$
pub fn s_curve(
    x: FloatValue,
    start: FloatValue,
    end: FloatValue,
    slope: FloatValue,
    midpoint: FloatValue,
) -> FloatValue {
    start + (end - start) * sigmoid(slope * (x - midpoint))
}

/// Smoothly floor `value` at `min_value`.
///
/// Values above `min_value` are returned unchanged. Below it the value decays
/// exponentially towards `0.9 * min_value`:
///
/// $$ f(x) = m \left(0.9 + 0.1 \, e^{(x - m) / (0.1 m)}\right) \quad x < m $$
///
/// The blend is continuous with a continuous first derivative at `min_value`.
/// `min_value` must be strictly positive.
pub fn exp_min<T: Scalar>(value: T, min_value: FloatValue) -> T {
    if value.re() >= min_value {
        return value;
    }
    let width = 0.1 * min_value;
    let decay = ((value - T::real(min_value)) / T::real(width)).exp();
    T::real(min_value) * (T::real(0.9) + T::real(0.1) * decay)
}

/// Derivative of [`exp_min`] with respect to `value`.
pub fn exp_min_derivative(value: FloatValue, min_value: FloatValue) -> FloatValue {
    if value >= min_value {
        return 1.0;
    }
    let width = 0.1 * min_value;
    ((value - min_value) / width).exp()
}

/// Exponentially weighted soft maximum.
///
/// $$ S_\alpha(x) = \frac{\sum_i x_i e^{\alpha x_i}}{\sum_i e^{\alpha x_i}} $$
///
/// The exponents are shifted by the largest real part so large `alpha` cannot overflow.
/// The result always lies between the smallest and largest input, and equals the
/// common value when all inputs are equal. Returns zero for an empty slice.
pub fn smooth_maximum<T: Scalar>(values: &[T], alpha: FloatValue) -> T {
    if values.is_empty() {
        return T::zero();
    }
    let shift = values
        .iter()
        .map(|v| v.re())
        .fold(FloatValue::NEG_INFINITY, FloatValue::max);
    let mut numerator = T::zero();
    let mut denominator = T::zero();
    for &v in values {
        let weight = (T::real(alpha) * (v - T::real(shift))).exp();
        numerator = numerator + v * weight;
        denominator = denominator + weight;
    }
    numerator / denominator
}

/// Partial derivatives of [`smooth_maximum`].
///
/// $$ \frac{\partial S}{\partial x_i} = w_i (1 + \alpha (x_i - S)) $$
pub fn smooth_maximum_gradient(values: &[FloatValue], alpha: FloatValue) -> Vec<FloatValue> {
    if values.is_empty() {
        return Vec::new();
    }
    let shift = values.iter().copied().fold(FloatValue::NEG_INFINITY, FloatValue::max);
    let weights: Vec<FloatValue> = values
        .iter()
        .map(|v| (alpha * (v - shift)).exp())
        .collect();
    let total: FloatValue = weights.iter().sum();
    let smax = smooth_maximum(values, alpha);
    values
        .iter()
        .zip(weights)
        .map(|(v, w)| w / total * (1.0 + alpha * (v - smax)))
        .collect()
}

/// Soft minimum, `-smooth_maximum(-x)`.
pub fn smooth_minimum<T: Scalar>(values: &[T], alpha: FloatValue) -> T {
    let negated: Vec<T> = values.iter().map(|&v| -v).collect();
    -smooth_maximum(&negated, alpha)
}

/// Partial derivatives of [`smooth_minimum`].
pub fn smooth_minimum_gradient(values: &[FloatValue], alpha: FloatValue) -> Vec<FloatValue> {
    let negated: Vec<FloatValue> = values.iter().map(|v| -v).collect();
    smooth_maximum_gradient(&negated, alpha)
}

/// Index of the smallest real part. Ties resolve to the first occurrence.
pub fn argmin<T: Scalar>(values: &[T]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, FloatValue)>, (i, v)| match best {
            Some((_, b)) if b <= v.re() => best,
            _ => Some((i, v.re())),
        })
        .map(|(i, _)| i)
}
