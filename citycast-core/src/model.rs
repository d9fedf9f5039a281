use std::{fmt, str::FromStr};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One of the fixed cities offered next to the current-location control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Zurich,
    Stockholm,
    Auckland,
    Amsterdam,
}

impl City {
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Zurich => "Zurich",
            City::Stockholm => "Stockholm",
            City::Auckland => "Auckland",
            City::Amsterdam => "Amsterdam",
        }
    }

    /// Timezone used for the city, independent of anything the API reports.
    pub fn timezone(&self) -> Tz {
        match self {
            City::Zurich => chrono_tz::Europe::Zurich,
            City::Stockholm => chrono_tz::Europe::Stockholm,
            City::Auckland => chrono_tz::Pacific::Auckland,
            City::Amsterdam => chrono_tz::Europe::Amsterdam,
        }
    }

    pub const fn all() -> &'static [City] {
        &[City::Zurich, City::Stockholm, City::Auckland, City::Amsterdam]
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown city '{0}'. Supported cities: Zurich, Stockholm, Auckland, Amsterdam.")]
pub struct UnknownCity(pub String);

impl FromStr for City {
    type Err = UnknownCity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        City::all()
            .iter()
            .copied()
            .find(|city| city.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownCity(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Where the geolocation provider thinks the user is.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    /// Detected local timezone, if the provider reported a known one.
    pub timezone: Option<Tz>,
}

/// Current conditions as displayed. Fahrenheit, icon and background are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub temperature_c: f64,
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
    pub description: String,
    pub timezone: Tz,
}

/// One day of the forecast strip.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub day_label: String,
    pub temperature_c: f64,
    pub description: String,
}

// Wire types of the OpenWeather 2.5 API. Only the fields we show are kept.

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMain {
    pub temp: f64,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCondition {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawWeather {
    pub name: String,
    pub main: RawMain,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawForecastItem {
    pub dt_txt: String,
    pub main: RawMain,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawForecast {
    pub list: Vec<RawForecastItem>,
}

/// Both responses of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReport {
    pub weather: RawWeather,
    pub forecast: RawForecast,
}

pub(crate) fn first_description(conditions: &[RawCondition]) -> String {
    conditions
        .first()
        .map(|c| c.description.clone())
        .unwrap_or_else(|| "unknown".to_string())
}
