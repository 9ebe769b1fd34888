//! Numeric types shared by every engine.
//!
//! All engines are generic over [`Scalar`] so that the same code path evaluates on `f64`
//! and on `Complex64`. The complex instantiation is how analytic Jacobians are checked
//! with the complex-step method: perturbing an input by `i * h` leaves the real part
//! untouched and carries the directional derivative in the imaginary part.

use num::complex::ComplexFloat;
use std::fmt::Debug;

/// Floating point type of every real-valued quantity.
pub type FloatValue = f64;

/// Calendar year.
pub type Year = i32;

/// Number type accepted by the engines.
///
/// Blanket-implemented for `f64` and `num::complex::Complex64`.
pub trait Scalar:
    ComplexFloat<Real = FloatValue> + From<FloatValue> + Debug + Send + Sync + 'static
{
    /// Promote a real constant.
    #[inline]
    fn real(value: FloatValue) -> Self {
        <Self as From<FloatValue>>::from(value)
    }
}

impl<T> Scalar for T where
    T: ComplexFloat<Real = FloatValue> + From<FloatValue> + Debug + Send + Sync + 'static
{
}

/// Heaviside step on the real part: 1 for strictly positive values, 0 otherwise.
#[inline]
pub fn positive_part_mask<T: Scalar>(value: T) -> FloatValue {
    if value.re() > 0.0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::complex::Complex64;

    #[test]
    fn real_promotion() {
        let x: Complex64 = Scalar::real(2.5);
        assert_eq!(x, Complex64::new(2.5, 0.0));
        let y: f64 = Scalar::real(2.5);
        assert_eq!(y, 2.5);
    }

    #[test]
    fn mask_uses_real_part() {
        assert_eq!(positive_part_mask(Complex64::new(0.1, -5.0)), 1.0);
        assert_eq!(positive_part_mask(Complex64::new(-0.1, 5.0)), 0.0);
        assert_eq!(positive_part_mask(0.0_f64), 0.0);
    }
}
