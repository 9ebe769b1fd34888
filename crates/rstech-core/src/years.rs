//! The simulation year axis.

use crate::errors::{RSTechError, RSTechResult};
use crate::scalar::{FloatValue, Year};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Inclusive range of simulation years.
///
/// Every series handled by the engines is indexed by this range, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    year_start: Year,
    year_end: Year,
}

impl YearRange {
    pub fn new(year_start: Year, year_end: Year) -> RSTechResult<Self> {
        if year_end < year_start {
            return Err(RSTechError::InvalidYearRange {
                year_start,
                year_end,
            });
        }
        Ok(Self {
            year_start,
            year_end,
        })
    }

    pub fn year_start(&self) -> Year {
        self.year_start
    }

    pub fn year_end(&self) -> Year {
        self.year_end
    }

    /// Number of simulated years
    pub fn len(&self) -> usize {
        (self.year_end - self.year_start + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = Year> {
        self.year_start..=self.year_end
    }

    pub fn years(&self) -> Vec<Year> {
        self.iter().collect()
    }

    /// Position of `year` on the axis, if it is simulated
    pub fn index_of(&self, year: Year) -> Option<usize> {
        if year < self.year_start || year > self.year_end {
            None
        } else {
            Some((year - self.year_start) as usize)
        }
    }

    pub fn as_array(&self) -> Array1<FloatValue> {
        self.iter().map(|y| y as FloatValue).collect()
    }

    /// Check that a series spans the axis.
    pub fn check_length(&self, variable: &str, got: usize) -> RSTechResult<()> {
        if got != self.len() {
            return Err(RSTechError::LengthMismatch {
                variable: variable.to_string(),
                expected: self.len(),
                got,
            });
        }
        Ok(())
    }
}
