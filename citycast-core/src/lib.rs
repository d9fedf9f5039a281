//! Core library for the `citycast` weather app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and IP-based geolocation
//! - Formatting of API data for display (classification, units, dates)
//! - The application state machine and the session that drives it
//!
//! It is used by `citycast-cli`, but can also be reused by other front-ends.

pub mod client;
pub mod config;
pub mod controller;
pub mod format;
pub mod geo;
pub mod model;
pub mod session;

pub use client::{OpenWeatherClient, WeatherClient, WeatherError};
pub use config::Config;
pub use controller::{Action, AppState, Effect, FetchTarget, Phase, RequestId};
pub use format::{BackgroundClass, IconKind};
pub use geo::{GeolocationError, Geolocator, IpGeolocator};
pub use model::{City, Coordinates, ForecastEntry, Position, WeatherSnapshot};
pub use session::Session;
