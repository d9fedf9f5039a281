use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    client::WeatherClient,
    controller::{Action, AppState, Effect, FetchTarget},
    format::{select_forecast, snapshot_from_raw},
    geo::Geolocator,
    model::City,
};

/// Drives an [`AppState`]: reduces actions and runs their effects on tokio.
///
/// Effects run as spawned tasks and report back through a channel, so a new
/// intent can be dispatched while an older fetch is still in flight. The
/// reducer drops whichever result is stale.
#[derive(Debug)]
pub struct Session {
    state: AppState,
    client: Arc<dyn WeatherClient>,
    locator: Arc<dyn Geolocator>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
}

impl Session {
    pub fn new(
        client: Arc<dyn WeatherClient>,
        locator: Arc<dyn Geolocator>,
        fallback_city: City,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(fallback_city),
            client,
            locator,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, action: Action) {
        let transition = self.state.clone().reduce(action);
        self.state = transition.state;
        if let Some(effect) = transition.effect {
            self.spawn(effect);
        }
    }

    /// Waits until the current request has settled (success or failure).
    pub async fn settle(&mut self) -> &AppState {
        while self.state.is_loading() {
            match self.rx.recv().await {
                Some(action) => self.dispatch(action),
                None => break,
            }
        }
        &self.state
    }

    fn spawn(&self, effect: Effect) {
        let client = Arc::clone(&self.client);
        let locator = Arc::clone(&self.locator);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let action = run_effect(effect, client.as_ref(), locator.as_ref()).await;
            if tx.send(action).is_err() {
                debug!("session dropped before effect completed");
            }
        });
    }
}

async fn run_effect(
    effect: Effect,
    client: &dyn WeatherClient,
    locator: &dyn Geolocator,
) -> Action {
    match effect {
        Effect::Locate { request } => match locator.locate().await {
            Ok(position) => Action::Located { request, position },
            Err(err) => Action::LocateFailed {
                request,
                reason: err.to_string(),
            },
        },

        Effect::Fetch {
            request,
            target,
            timezone,
        } => {
            let result = match &target {
                FetchTarget::Coordinates(coordinates) => {
                    client.fetch_by_coordinates(*coordinates).await
                }
                FetchTarget::City(city) => client.fetch_by_city(city.as_str()).await,
            };

            match result {
                Ok(report) => Action::FetchSucceeded {
                    request,
                    snapshot: snapshot_from_raw(&report.weather, timezone),
                    forecast: select_forecast(&report.forecast),
                },
                Err(err) => {
                    warn!(?target, error = %err, "weather fetch failed");
                    Action::FetchFailed {
                        request,
                        message: format!("Failed to load weather: {err}"),
                    }
                }
            }
        }
    }
}
