//! Text rendering of the application state.
//!
//! Views hold no state of their own; everything is recomputed from
//! [`AppState`] on every render.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use citycast_core::{
    AppState, City,
    format::{display_celsius, display_fahrenheit, format_today, lookup_icon},
};

pub const LOADING: &str = "⏳ Loading weather...";

/// What a control in the button row selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    CurrentLocation,
    City(City),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub target: Target,
    pub active: bool,
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.active { "●" } else { "○" };
        match self.target {
            Target::CurrentLocation => write!(f, "{marker} Current location"),
            Target::City(city) => write!(f, "{marker} {city}"),
        }
    }
}

/// One "current location" control followed by one control per city.
pub fn button_row(state: &AppState) -> Vec<Button> {
    let current = Button {
        target: Target::CurrentLocation,
        active: state.selected_city.is_none(),
    };

    std::iter::once(current)
        .chain(City::all().iter().map(|&city| Button {
            target: Target::City(city),
            active: state.selected_city == Some(city),
        }))
        .collect()
}

pub fn render_weather_box(state: &AppState, now: DateTime<Utc>) -> String {
    let Some(snapshot) = &state.snapshot else {
        return "No weather data yet.".to_string();
    };

    let mut out = String::new();
    let celsius = display_celsius(snapshot.temperature_c);
    let fahrenheit = display_fahrenheit(snapshot.temperature_c);
    let icon = state.icon.map(|i| i.glyph()).unwrap_or(" ");

    // writing to a String cannot fail
    let _ = writeln!(out, "[{}]", state.background.as_str());
    let _ = writeln!(out, "📍 {}", snapshot.location_name);
    let _ = writeln!(out, "{}", format_today(now, state.timezone));
    let _ = writeln!(out, "{celsius}°C / {fahrenheit}°F");
    let _ = writeln!(out, "{icon} {}", snapshot.description);
    let _ = writeln!(
        out,
        "↑ {}°  ↓ {}°",
        display_celsius(snapshot.temperature_max_c),
        display_celsius(snapshot.temperature_min_c),
    );

    if !state.forecast.is_empty() {
        out.push('\n');
        for entry in &state.forecast {
            let icon = lookup_icon(&entry.description).map(|i| i.glyph()).unwrap_or(" ");
            let _ = writeln!(
                out,
                "{:<4} {icon}  {}°C",
                entry.day_label,
                display_celsius(entry.temperature_c)
            );
        }
    }

    out
}

pub fn render_alert(message: &str) -> String {
    let width = message.chars().count() + 4;
    let border = "─".repeat(width);
    format!("┌{border}┐\n│  {message}  │\n└{border}┘")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use citycast_core::{Action, ForecastEntry, WeatherSnapshot};

    fn ready_state() -> AppState {
        let t = AppState::new(City::Zurich).reduce(Action::SelectCity(City::Zurich));
        let citycast_core::Phase::Loading(request) = t.state.phase else {
            panic!("expected loading");
        };
        t.state
            .reduce(Action::FetchSucceeded {
                request,
                snapshot: WeatherSnapshot {
                    location_name: "Zurich".into(),
                    temperature_c: 7.2,
                    temperature_min_c: 5.5,
                    temperature_max_c: 9.0,
                    description: "light rain".into(),
                    timezone: City::Zurich.timezone(),
                },
                forecast: vec![
                    ForecastEntry {
                        day_label: "Tue".into(),
                        temperature_c: 3.1,
                        description: "light snow".into(),
                    },
                    ForecastEntry {
                        day_label: "Wed".into(),
                        temperature_c: -1.5,
                        description: "very light drizzle".into(),
                    },
                ],
            })
            .state
    }

    #[test]
    fn current_location_is_active_by_default() {
        let buttons = button_row(&AppState::new(City::Zurich));

        assert_eq!(buttons.len(), 5);
        assert!(buttons[0].active);
        assert!(buttons[1..].iter().all(|b| !b.active));
        assert_eq!(buttons[0].to_string(), "● Current location");
    }

    #[test]
    fn selected_city_is_highlighted() {
        let buttons = button_row(&ready_state());

        let active: Vec<_> = buttons.iter().filter(|b| b.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].target, Target::City(City::Zurich));
        assert_eq!(buttons[1].to_string(), "● Zurich");
        assert_eq!(buttons[2].to_string(), "○ Stockholm");
    }

    #[test]
    fn weather_box_contents() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let text = render_weather_box(&ready_state(), now);

        assert!(text.starts_with("[rain]\n"));
        assert!(text.contains("📍 Zurich"));
        assert!(text.contains("Today Jan 15 2024 Mon 13:00"));
        // shown as 8°C, 8°C -> 46.4°F
        assert!(text.contains("8°C / 47°F"));
        assert!(text.contains("🌦 light rain"));
        assert!(text.contains("↑ 9°  ↓ 6°"));
        assert!(text.contains("Tue  🌨  4°C"));
        // no icon for descriptions outside the table, negative values round up
        assert!(text.contains("Wed     -1°C"));
    }

    #[test]
    fn empty_state() {
        let text = render_weather_box(&AppState::new(City::Zurich), Utc::now());
        assert_eq!(text, "No weather data yet.");
    }

    #[test]
    fn alert_is_boxed() {
        let alert = render_alert("boom");
        assert_eq!(alert, "┌────────┐\n│  boom  │\n└────────┘");
    }
}
