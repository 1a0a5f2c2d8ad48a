use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevenuePulseError {
    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("Duplicate revenue record for {date}")]
    DuplicateDate { date: String },

    #[error("Invalid revenue value {value} for {location} on {date}: must be a non-negative number")]
    InvalidRevenue {
        date: String,
        location: String,
        value: f64,
    },

    #[error("No revenue data available: {0}")]
    NoData(String),

    #[error("Dataset failed validation: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RevenuePulseError>;
