//! NASA POWER daily-point client (live reanalysis source)

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::SourcesConfig;
use crate::error::ParadecastError;
use crate::models::{LiveObservation, Location};
use crate::Result;

/// POWER reports missing values with this sentinel
const MISSING_SENTINEL: f64 = -999.0;

const PARAMETERS: &str = "T2M_MAX,T2M_MIN,RH2M,WS10M,PRECTOTCORR";

/// Client for the NASA POWER temporal/daily point API
pub struct PowerClient {
    client: Client,
    base_url: String,
}

/// Daily-point response, keyed parameter name -> YYYYMMDD -> value
#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: HashMap<String, HashMap<String, f64>>,
}

impl PowerClient {
    /// Create a new client with the configured timeout
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("paradecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ParadecastError::source(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.power_base_url.clone(),
        })
    }

    /// Fetch the daily observation for one point and date.
    ///
    /// Returns `Ok(None)` when POWER answers but every parameter carries
    /// the missing sentinel (common for dates past the reanalysis horizon).
    #[instrument(skip(self), fields(lat = location.latitude, lon = location.longitude, %date))]
    pub async fn fetch_daily(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<Option<LiveObservation>> {
        let day = date.format("%Y%m%d").to_string();
        let url = format!(
            "{}?parameters={}&community=RE&latitude={}&longitude={}&start={}&end={}&format=JSON",
            self.base_url, PARAMETERS, location.latitude, location.longitude, day, day
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ParadecastError::source(format!("POWER request failed: {e}")))?
            .error_for_status()
            .map_err(|e| ParadecastError::source(format!("POWER returned an error status: {e}")))?;

        let body: PowerResponse = response.json().await.map_err(|e| {
            ParadecastError::source(format!("Failed to parse POWER daily-point response: {e}"))
        })?;

        let value = |name: &str| -> Option<f64> {
            body.properties
                .parameter
                .get(name)
                .and_then(|series| series.get(&day))
                .copied()
                .filter(|v| (*v - MISSING_SENTINEL).abs() > f64::EPSILON)
        };

        let observation = LiveObservation::new(
            value("T2M_MAX"),
            value("T2M_MIN"),
            value("RH2M"),
            value("WS10M"),
            value("PRECTOTCORR"),
        );

        if observation.is_empty() {
            debug!("POWER answered with no usable parameters for {day}");
            return Ok(None);
        }

        debug!(?observation, "POWER daily observation");
        Ok(Some(observation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> &'static str {
        r#"{
            "properties": {
                "parameter": {
                    "T2M_MAX": {"20260801": 31.4},
                    "T2M_MIN": {"20260801": 18.2},
                    "RH2M": {"20260801": 62.0},
                    "WS10M": {"20260801": 4.7},
                    "PRECTOTCORR": {"20260801": -999.0}
                }
            }
        }"#
    }

    #[test]
    fn test_parse_daily_response() {
        let body: PowerResponse = serde_json::from_str(sample_body()).unwrap();
        let series = &body.properties.parameter;
        assert_eq!(series["T2M_MAX"]["20260801"], 31.4);
        assert_eq!(series["PRECTOTCORR"]["20260801"], MISSING_SENTINEL);
    }

    #[test]
    fn test_sentinel_maps_to_missing() {
        let body: PowerResponse = serde_json::from_str(sample_body()).unwrap();
        let day = "20260801".to_string();
        let value = |name: &str| -> Option<f64> {
            body.properties
                .parameter
                .get(name)
                .and_then(|series| series.get(&day))
                .copied()
                .filter(|v| (*v - MISSING_SENTINEL).abs() > f64::EPSILON)
        };
        assert_eq!(value("T2M_MAX"), Some(31.4));
        assert_eq!(value("PRECTOTCORR"), None);
        assert_eq!(value("UNKNOWN"), None);
    }

    #[test]
    fn test_client_builds_from_default_config() {
        let config = SourcesConfig::default();
        assert!(PowerClient::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_source_error() {
        let config = SourcesConfig {
            power_base_url: "http://127.0.0.1:1/api/temporal/daily/point".to_string(),
            timeout_seconds: 1,
        };
        let client = PowerClient::new(&config).unwrap();
        let error = client
            .fetch_daily(
                &Location {
                    latitude: 48.1,
                    longitude: 11.6,
                },
                NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(error, ParadecastError::Source { .. }));
        assert!(error.user_message().contains("upstream"));
    }
}
