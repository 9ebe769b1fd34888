use thiserror::Error;

/// Error type for invalid configurations and inputs.
#[derive(Error, Debug)]
pub enum RSTechError {
    #[error("{0}")]
    Error(String),
    #[error("The CAPEX unit {0} is not handled. Expected one of $/kW, euro/kW, $/MW, $/kWh, $/MWh, $/t, $/kg")]
    UnknownCapexUnit(String),
    #[error("The energy demand unit {0} is not handled. Expected one of kWh/kWh, MWh/MWh, kWh/kg, MWh/t, kWh/t, GJ/t")]
    UnknownEnergyDemandUnit(String),
    #[error("Invalid year range. year_end={year_end} is before year_start={year_start}")]
    InvalidYearRange { year_start: i32, year_end: i32 },
    #[error("Wrong length for `{variable}`. Expected {expected} values, got {got}")]
    LengthMismatch {
        variable: String,
        expected: usize,
        got: usize,
    },
    #[error("Missing input `{0}`")]
    MissingInput(String),
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Could not parse techno configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, RSTechError>`.
pub type RSTechResult<T> = Result<T, RSTechError>;
