//! Reverse geocoding: convert coordinates to a place and country.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use agri_core::{GeocodingConfig, HttpConfig, NetworkError, ReqwestErrorExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{Coordinates, LocationError, LocationInfo};

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
    /// Set instead of `address` when nothing is found (e.g. open water)
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

impl From<NominatimAddress> for LocationInfo {
    fn from(addr: NominatimAddress) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        // Prefer city > town > village
        let place = non_empty(addr.city)
            .or_else(|| non_empty(addr.town))
            .or_else(|| non_empty(addr.village));

        Self {
            place,
            country: non_empty(addr.country),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new(config: &GeocodingConfig, http: &HttpConfig) -> Result<Self, LocationError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = http.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LocationError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve coordinates with a single request. No retry.
    #[instrument(skip(self), level = "debug")]
    pub async fn resolve(&self, coords: Coordinates) -> Result<LocationInfo, LocationError> {
        let url = format!("{}/reverse", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let address = body.address.ok_or_else(|| {
            LocationError::NoAddress(body.error.unwrap_or_else(|| "empty response".to_string()))
        })?;

        let info = LocationInfo::from(address);
        tracing::info!("Reverse geocoded to: {}", info.describe());
        Ok(info)
    }
}
