//! Numerical helpers shared across engines.

pub mod smoothing;
