use agri_core::{AppError, NetworkError};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_CITY: &str = "Unknown City";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Geographic position in decimal degrees, supplied by the embedding application
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Human-readable place resolved from [`Coordinates`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// City, town or village, whichever the geocoder reported first
    pub place: Option<String>,
    pub country: Option<String>,
}

impl LocationInfo {
    pub fn new(place: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            place: Some(place.into()),
            country: Some(country.into()),
        }
    }

    /// "Place, Country", substituting the unknown markers for missing parts.
    pub fn describe(&self) -> String {
        format!(
            "{}, {}",
            self.place.as_deref().unwrap_or(UNKNOWN_CITY),
            self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
        )
    }
}

/// Describe a possibly-unresolved location for prompt text.
///
/// An absent resolution reads the same as a resolution with no parts.
pub fn describe_location(info: Option<&LocationInfo>) -> String {
    match info {
        Some(info) => info.describe(),
        None => LocationInfo::default().describe(),
    }
}

/// Reverse geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Geocoding request failed: {0}")]
    Network(#[from] NetworkError),
    #[error("No address for coordinates: {0}")]
    NoAddress(String),
    #[error("Geocoding client error: {0}")]
    Client(String),
}

/// Climate data errors
#[derive(Debug, thiserror::Error)]
pub enum ClimateError {
    #[error("Climate request failed: {0}")]
    Network(#[from] NetworkError),
    #[error("Climate data error: {0}")]
    Parse(String),
    #[error("Climate file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

impl From<LocationError> for AppError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::Network(e) => AppError::Network(e),
            other => AppError::Service(other.to_string()),
        }
    }
}

impl From<ClimateError> for AppError {
    fn from(err: ClimateError) -> Self {
        match err {
            ClimateError::Network(e) => AppError::Network(e),
            ClimateError::Io(e) => AppError::Io(e),
            other => AppError::Service(other.to_string()),
        }
    }
}
