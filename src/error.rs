use thiserror::Error;

use crate::types::CountyRef;

/// Errors raised by the county resolution engine and its reference data.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("zip code {0} is not in the zip index")]
    ZipNotFound(String),

    #[error("unknown state: {0}")]
    UnknownState(String),

    #[error("county {county} not found in {state}")]
    UnknownCounty { county: String, state: String },

    #[error("no high-poverty county found within {max_radius} degrees of {origin}")]
    NoPovertyCountyFound { origin: CountyRef, max_radius: u32 },

    #[error("malformed county key in location data: {0:?}")]
    MalformedCountyKey(String),

    #[error("location data has no country entry")]
    MissingCountry,

    #[error("{path}: {message}")]
    Dataset { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeoError>;
