//! Climate context: opaque JSON handed to the advice prompt unchanged.
//!
//! The embedding application normally supplies it. [`NasaPowerClient`] can
//! fetch recent daily agro-climatology from NASA POWER when it does not.

use std::path::Path;

use agri_core::{ClimateConfig, HttpConfig, NetworkError, ReqwestErrorExt};
use chrono::{Days, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::types::{ClimateError, Coordinates};

/// Daily parameters requested from NASA POWER (AG community)
pub const NASA_POWER_PARAMETERS: &str =
    "T2M,T2M_MAX,T2M_MIN,PRECTOTCORR,RH2M,WS2M,ALLSKY_SFC_SW_DWN";

/// Externally supplied climate dataset. Never validated or interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClimateContext(Value);

impl ClimateContext {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Compact JSON exactly as it goes into the prompt
    pub fn to_prompt_string(&self) -> String {
        self.0.to_string()
    }

    /// Read a dataset from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ClimateError> {
        let contents = std::fs::read_to_string(path)?;
        let value = serde_json::from_str(&contents)
            .map_err(|e| ClimateError::Parse(format!("{}: {}", path.display(), e)))?;
        Ok(Self(value))
    }
}

impl From<Value> for ClimateContext {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone)]
pub struct NasaPowerClient {
    client: Client,
    base_url: String,
    days: u32,
}

impl NasaPowerClient {
    pub fn new(config: &ClimateConfig, http: &HttpConfig) -> Result<Self, ClimateError> {
        let mut builder = Client::builder();
        if let Some(timeout) = http.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClimateError::Parse(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            days: config.days,
        })
    }

    /// Fetch the configured number of days ending the day before `today`.
    pub async fn fetch_recent(
        &self,
        coords: Coordinates,
        today: NaiveDate,
    ) -> Result<ClimateContext, ClimateError> {
        let (start, end) = recent_window(today, self.days)?;
        self.fetch_daily(coords, start, end).await
    }

    /// Fetch daily point data for an inclusive date range.
    ///
    /// Returns the `properties.parameter` block, or the whole body if that
    /// block is missing.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_daily(
        &self,
        coords: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ClimateContext, ClimateError> {
        if start > end {
            return Err(ClimateError::InvalidRange(format!("{} is after {}", start, end)));
        }

        let url = format!("{}/api/temporal/daily/point", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("parameters", NASA_POWER_PARAMETERS.to_string()),
                ("community", "AG".to_string()),
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("start", start.format("%Y%m%d").to_string()),
                ("end", end.format("%Y%m%d").to_string()),
                ("format", "JSON".to_string()),
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

        let mut body: Value = response
            .json()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let parameters = body.pointer_mut("/properties/parameter").map(Value::take);
        let context = match parameters {
            Some(parameters) => ClimateContext(parameters),
            None => {
                tracing::debug!("NASA POWER response has no properties.parameter block");
                ClimateContext(body)
            }
        };

        tracing::info!("Fetched climate data {} to {}", start, end);
        Ok(context)
    }
}

/// Inclusive window of `days` days ending the day before `today`.
/// NASA POWER lags real time, so today itself is never requested.
pub fn recent_window(today: NaiveDate, days: u32) -> Result<(NaiveDate, NaiveDate), ClimateError> {
    if days == 0 {
        return Err(ClimateError::InvalidRange("window of zero days".to_string()));
    }
    let end = today
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| ClimateError::InvalidRange(format!("no day before {}", today)))?;
    let start = end
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| ClimateError::InvalidRange(format!("{} days before {}", days, end)))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_prompt_string_is_compact_json() {
        let ctx = ClimateContext::new(json!({"T2M": {"20240101": 21.5}}));
        assert_eq!(ctx.to_prompt_string(), r#"{"T2M":{"20240101":21.5}}"#);
    }

    #[test]
    fn test_default_context_is_null() {
        assert_eq!(ClimateContext::default().to_prompt_string(), "null");
    }

    #[test]
    fn test_recent_window() {
        let (start, end) = recent_window(date(2024, 3, 10), 7).unwrap();
        assert_eq!(end, date(2024, 3, 9));
        assert_eq!(start, date(2024, 3, 3));
    }

    #[test]
    fn test_recent_window_single_day() {
        let (start, end) = recent_window(date(2024, 1, 1), 1).unwrap();
        assert_eq!(start, date(2023, 12, 31));
        assert_eq!(start, end);
    }

    #[test]
    fn test_recent_window_rejects_zero_days() {
        assert!(matches!(
            recent_window(date(2024, 1, 1), 0),
            Err(ClimateError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climate.json");
        std::fs::write(&path, r#"{"PRECTOTCORR": {"20240101": 3.2}}"#).unwrap();

        let ctx = ClimateContext::from_json_file(&path).unwrap();
        assert_eq!(ctx.as_value()["PRECTOTCORR"]["20240101"], json!(3.2));
    }

    #[test]
    fn test_from_json_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climate.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            ClimateContext::from_json_file(&path),
            Err(ClimateError::Parse(_))
        ));
    }
}
