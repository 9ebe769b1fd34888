//! Jacobian containers and the complex-step reference derivative.

use crate::scalar::FloatValue;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use num::complex::Complex64;
use std::collections::BTreeMap;

/// Imaginary step of [`complex_step`].
///
/// No subtraction is involved, so the step can be far below machine epsilon.
pub const COMPLEX_STEP: FloatValue = 1e-30;

/// Key of a Jacobian block, `("output|column", "input|column")`.
pub type JacobianKey = (String, String);

/// Partial derivatives of the outputs of one evaluation.
///
/// Each block has one row per simulated year of the output and one column per year of
/// the input. Pairs that are structurally zero are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Jacobian {
    blocks: BTreeMap<JacobianKey, Array2<FloatValue>>,
}

impl Jacobian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block, replacing any existing one for the same pair.
    pub fn insert(
        &mut self,
        output: impl Into<String>,
        input: impl Into<String>,
        block: Array2<FloatValue>,
    ) {
        self.blocks.insert((output.into(), input.into()), block);
    }

    pub fn get(&self, output: &str, input: &str) -> Option<&Array2<FloatValue>> {
        self.blocks.get(&(output.to_string(), input.to_string()))
    }

    pub fn contains(&self, output: &str, input: &str) -> bool {
        self.get(output, input).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &JacobianKey> {
        self.blocks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JacobianKey, &Array2<FloatValue>)> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Square matrix with `values` on the diagonal.
pub fn diagonal(values: ArrayView1<FloatValue>) -> Array2<FloatValue> {
    Array2::from_diag(&values)
}

/// Multiply row `i` of `matrix` by `factors[i]`, i.e. `diag(factors) * matrix`.
pub fn scale_rows(
    matrix: ArrayView2<FloatValue>,
    factors: ArrayView1<FloatValue>,
) -> Array2<FloatValue> {
    let mut scaled = matrix.to_owned();
    for (mut row, &f) in scaled.rows_mut().into_iter().zip(factors) {
        row *= f;
    }
    scaled
}

/// Jacobian of `f` at `x` by the complex-step method.
///
/// Column `j` is $\mathrm{Im}(f(x + i h e_j)) / h$. `f` must be analytic in its
/// argument, which holds for every engine running on [`crate::scalar::Scalar`].
pub fn complex_step<F>(x: ArrayView1<FloatValue>, f: F) -> Array2<FloatValue>
where
    F: Fn(ArrayView1<Complex64>) -> Array1<Complex64>,
{
    let base: Array1<Complex64> = x.mapv(|v| Complex64::new(v, 0.0));
    let mut columns = Vec::with_capacity(x.len());
    for j in 0..x.len() {
        let mut perturbed = base.clone();
        perturbed[j].im = COMPLEX_STEP;
        columns.push(f(perturbed.view()).mapv(|v| v.im / COMPLEX_STEP));
    }
    let n_rows = columns.first().map_or(0, |c| c.len());
    let mut jacobian = Array2::zeros((n_rows, x.len()));
    for (j, column) in columns.into_iter().enumerate() {
        jacobian.column_mut(j).assign(&column);
    }
    jacobian
}
