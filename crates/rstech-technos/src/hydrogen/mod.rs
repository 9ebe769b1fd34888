//! Hydrogen production technologies

mod smr;

pub use smr::Smr;
