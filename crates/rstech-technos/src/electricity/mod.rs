//! Power generation technologies

mod nuclear;
mod solar_pv;

pub use nuclear::Nuclear;
pub use solar_pv::SolarPv;
