//! Locating the user for the "current location" mode.
//!
//! A terminal has no browser geolocation, so the position is derived from
//! the public IP through an ip-api.com compatible endpoint.

use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, instrument};

use crate::model::{Coordinates, Position};

#[derive(Debug, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geolocation service refused the lookup: {0}")]
    Refused(String),

    #[error("geolocation service returned no coordinates")]
    MissingCoordinates,
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Position, GeolocationError>;
}

#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn locate(&self) -> Result<Position, GeolocationError> {
        let res: IpApiResponse = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if res.status != "success" {
            return Err(GeolocationError::Refused(
                res.message.unwrap_or_else(|| res.status.clone()),
            ));
        }

        let (Some(lat), Some(lon)) = (res.lat, res.lon) else {
            return Err(GeolocationError::MissingCoordinates);
        };

        let timezone = res.timezone.as_deref().and_then(|name| name.parse::<Tz>().ok());
        debug!(lat, lon, ?timezone, city = ?res.city, "located");

        Ok(Position {
            coordinates: Coordinates::new(lat, lon),
            timezone,
        })
    }
}
