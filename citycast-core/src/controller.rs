//! Application state and its single update path.
//!
//! `AppState::reduce` is the only way state changes. It never performs I/O;
//! work that has to happen outside (geolocation, HTTP) is returned as an
//! [`Effect`] and its outcome comes back in as another [`Action`].
//!
//! Every user intent gets a fresh [`RequestId`]. Completions carrying any
//! other id than the one currently loading are stale and dropped, so a slow
//! response for a city the user already left can't overwrite newer data.

use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::{
    format::{BackgroundClass, IconKind, classify_background, classify_icon},
    model::{City, Coordinates, ForecastEntry, Position, WeatherSnapshot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading(RequestId),
    Ready,
    /// A fetch failed; shown as an alert until acknowledged.
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchTarget {
    Coordinates(Coordinates),
    City(City),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Locate {
        request: RequestId,
    },
    Fetch {
        request: RequestId,
        target: FetchTarget,
        /// Timezone the resulting snapshot is displayed in.
        timezone: Tz,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Mount,
    UseCurrentLocation,
    SelectCity(City),
    Located {
        request: RequestId,
        position: Position,
    },
    LocateFailed {
        request: RequestId,
        reason: String,
    },
    FetchSucceeded {
        request: RequestId,
        snapshot: WeatherSnapshot,
        forecast: Vec<ForecastEntry>,
    },
    FetchFailed {
        request: RequestId,
        message: String,
    },
    /// The user dismissed the current alert or notice.
    Acknowledge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// `None` means current location.
    pub selected_city: Option<City>,
    pub phase: Phase,
    pub snapshot: Option<WeatherSnapshot>,
    pub forecast: Vec<ForecastEntry>,
    pub background: BackgroundClass,
    pub icon: Option<IconKind>,
    pub timezone: Tz,
    /// Informational message, e.g. that the fallback city is shown.
    pub notice: Option<String>,
    pub fallback_city: City,
    /// Selection the current snapshot was fetched for.
    shown_city: Option<City>,
    last_request: RequestId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    pub effect: Option<Effect>,
}

impl AppState {
    pub fn new(fallback_city: City) -> Self {
        Self {
            selected_city: None,
            phase: Phase::Idle,
            snapshot: None,
            forecast: Vec::new(),
            background: BackgroundClass::default(),
            icon: None,
            timezone: Tz::UTC,
            notice: None,
            fallback_city,
            shown_city: None,
            last_request: RequestId(0),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    fn is_current(&self, request: RequestId) -> bool {
        self.phase == Phase::Loading(request)
    }

    fn begin(&mut self) -> RequestId {
        self.last_request = RequestId(self.last_request.0 + 1);
        self.phase = Phase::Loading(self.last_request);
        self.last_request
    }

    fn fetch_city(&self, request: RequestId, city: City) -> Effect {
        Effect::Fetch {
            request,
            target: FetchTarget::City(city),
            timezone: city.timezone(),
        }
    }

    pub fn reduce(mut self, action: Action) -> Transition {
        let effect = match action {
            Action::Mount | Action::UseCurrentLocation => {
                self.selected_city = None;
                let request = self.begin();
                Some(Effect::Locate { request })
            }

            Action::SelectCity(city) => {
                if self.shown_city == Some(city) && self.phase == Phase::Ready {
                    None
                } else {
                    self.selected_city = Some(city);
                    self.timezone = city.timezone();
                    let request = self.begin();
                    Some(self.fetch_city(request, city))
                }
            }

            Action::Located { request, position } => {
                if !self.is_current(request) {
                    debug!(?request, "ignoring stale location");
                    return self.unchanged();
                }
                self.timezone = position.timezone.unwrap_or(Tz::UTC);
                Some(Effect::Fetch {
                    request,
                    target: FetchTarget::Coordinates(position.coordinates),
                    timezone: self.timezone,
                })
            }

            Action::LocateFailed { request, reason } => {
                if !self.is_current(request) {
                    return self.unchanged();
                }
                let city = self.fallback_city;
                warn!(%reason, %city, "could not determine location, falling back");
                self.selected_city = Some(city);
                self.timezone = city.timezone();
                self.notice = Some(format!(
                    "Could not determine your location ({reason}). Showing {city} instead."
                ));
                Some(self.fetch_city(request, city))
            }

            Action::FetchSucceeded {
                request,
                snapshot,
                forecast,
            } => {
                if !self.is_current(request) {
                    debug!(?request, "ignoring stale weather");
                    return self.unchanged();
                }
                if let Some(background) = classify_background(&snapshot.description) {
                    self.background = background;
                }
                if let Some(icon) = classify_icon(&snapshot.description) {
                    self.icon = Some(icon);
                }
                self.timezone = snapshot.timezone;
                self.shown_city = self.selected_city;
                self.snapshot = Some(snapshot);
                self.forecast = forecast;
                self.phase = Phase::Ready;
                None
            }

            Action::FetchFailed { request, message } => {
                if !self.is_current(request) {
                    return self.unchanged();
                }
                // the previous snapshot stays, so does the selection it belongs to
                if let Some(snapshot) = &self.snapshot {
                    self.selected_city = self.shown_city;
                    self.timezone = snapshot.timezone;
                }
                self.phase = Phase::Error(message);
                None
            }

            Action::Acknowledge => {
                self.notice = None;
                if matches!(self.phase, Phase::Error(_)) {
                    self.phase = if self.snapshot.is_some() {
                        Phase::Ready
                    } else {
                        Phase::Idle
                    };
                }
                None
            }
        };

        Transition {
            state: self,
            effect,
        }
    }

    fn unchanged(self) -> Transition {
        Transition {
            state: self,
            effect: None,
        }
    }
}
