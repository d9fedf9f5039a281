use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

use crate::{
    config::Config,
    model::{Coordinates, RawForecast, RawReport, RawWeather},
};

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    #[error("Failed to send request to OpenWeather ({endpoint}): {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse OpenWeather {endpoint} JSON: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Fetches current conditions and the 5-day/3-hour forecast in one go.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_by_coordinates(&self, coordinates: Coordinates)
    -> Result<RawReport, WeatherError>;

    async fn fetch_by_city(&self, city: &str) -> Result<RawReport, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(api_key.to_owned(), config.base_url()))
    }

    async fn fetch_both(&self, location: &[(&str, String)]) -> Result<RawReport, WeatherError> {
        // Both requests settle before the fetch completes, even if one fails early.
        let (weather, forecast) = tokio::join!(
            self.get_json::<RawWeather>("weather", location),
            self.get_json::<RawForecast>("forecast", location),
        );

        Ok(RawReport {
            weather: weather?,
            forecast: forecast?,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        location: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, "requesting");

        let res = self
            .http
            .get(&url)
            .query(location)
            .query(&[("units", "metric"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| WeatherError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Transport { endpoint, source })?;

        if !status.is_success() {
            warn!(endpoint, %status, "OpenWeather returned an error");
            return Err(WeatherError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Parse { endpoint, source })
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<RawReport, WeatherError> {
        if !coordinates.is_valid() {
            return Err(WeatherError::InvalidCoordinates);
        }

        self.fetch_both(&[
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
        ])
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_by_city(&self, city: &str) -> Result<RawReport, WeatherError> {
        self.fetch_both(&[("q", city.to_string())]).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
