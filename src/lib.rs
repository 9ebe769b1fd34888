//! Techno-economic models of energy production technologies.
//!
//! Re-exports the shared engines in [`engines`] and the concrete technologies in [`technos`].
//!
//! ```
//! use rstech::engines::techno::{TechnoInputs, TechnoModel};
//! use rstech::engines::years::YearRange;
//! use rstech::technos::electricity::SolarPv;
//!
//! let years = YearRange::new(2020, 2030).unwrap();
//! let pv = SolarPv::default();
//! let mut inputs = TechnoInputs::new(years, pv.parameters().construction_delay);
//! inputs.invest_level.fill(10.0);
//! let outputs = pv.compute(&inputs).unwrap();
//! assert!(outputs.production.iter().all(|&p| p >= 0.0));
//! ```

pub use rstech_core as engines;
pub use rstech_technos as technos;
