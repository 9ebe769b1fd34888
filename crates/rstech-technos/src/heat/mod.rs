//! Heat generation technologies

mod heat_pump;

pub use heat_pump::HeatPump;
