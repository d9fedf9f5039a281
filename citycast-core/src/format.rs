//! Pure helpers that turn API data into display values.
//!
//! Descriptions coming from the API are free text. Classification walks an
//! ordered rule list and returns the first rule whose phrase is contained in
//! the description. Earlier, more general phrases shadow later ones (e.g.
//! "light rain" hits the "rain" rule first), and the tables are kept in that
//! order on purpose.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::model::{
    ForecastEntry, RawForecast, RawWeather, WeatherSnapshot, first_description,
};

/// Background theme of the whole screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackgroundClass {
    #[default]
    Sunny,
    CloudSun,
    Cloud,
    CloudRain,
    Rain,
    Thunderstorm,
    Snow,
    Smog,
}

impl BackgroundClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundClass::Sunny => "sunny",
            BackgroundClass::CloudSun => "cloud-sun",
            BackgroundClass::Cloud => "cloud",
            BackgroundClass::CloudRain => "cloud-rain",
            BackgroundClass::Rain => "rain",
            BackgroundClass::Thunderstorm => "thunderstorm",
            BackgroundClass::Snow => "snow",
            BackgroundClass::Smog => "smog",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Sun,
    CloudSun,
    Cloud,
    CloudRain,
    CloudSunRain,
    CloudBolt,
    CloudMeatball,
    Smog,
}

impl IconKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconKind::Sun => "sun",
            IconKind::CloudSun => "cloud-sun",
            IconKind::Cloud => "cloud",
            IconKind::CloudRain => "cloud-rain",
            IconKind::CloudSunRain => "cloud-sun-rain",
            IconKind::CloudBolt => "cloud-bolt",
            IconKind::CloudMeatball => "cloud-meatball",
            IconKind::Smog => "smog",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            IconKind::Sun => "☀",
            IconKind::CloudSun => "⛅",
            IconKind::Cloud => "☁",
            IconKind::CloudRain => "🌧",
            IconKind::CloudSunRain => "🌦",
            IconKind::CloudBolt => "🌩",
            IconKind::CloudMeatball => "🌨",
            IconKind::Smog => "🌫",
        }
    }
}

/// A (predicate, category) pair. The predicate is phrase containment.
#[derive(Debug, Clone, Copy)]
pub struct Rule<C> {
    pub phrase: &'static str,
    pub category: C,
}

impl<C: Copy> Rule<C> {
    const fn new(phrase: &'static str, category: C) -> Self {
        Self { phrase, category }
    }

    pub fn matches(&self, description: &str) -> bool {
        description.contains(self.phrase)
    }
}

/// First matching rule wins; `None` when nothing matches.
pub fn classify<C: Copy>(rules: &[Rule<C>], description: &str) -> Option<C> {
    rules
        .iter()
        .find(|rule| rule.matches(description))
        .map(|rule| rule.category)
}

use self::BackgroundClass as B;
use self::IconKind as I;

pub static BACKGROUND_RULES: &[Rule<BackgroundClass>] = &[
    Rule::new("clear sky", B::Sunny),
    Rule::new("few clouds", B::CloudSun),
    Rule::new("scattered clouds", B::Cloud),
    Rule::new("broken clouds", B::Cloud),
    Rule::new("shower rain", B::CloudRain),
    Rule::new("rain", B::Rain),
    Rule::new("thunderstorm", B::Thunderstorm),
    Rule::new("snow", B::Snow),
    Rule::new("mist", B::Smog),
    Rule::new("overcast clouds", B::Cloud),
    Rule::new("light rain", B::CloudRain),
    Rule::new("moderate rain", B::CloudRain),
    Rule::new("heavy intensity rain", B::Rain),
    Rule::new("very heavy rain", B::Rain),
    Rule::new("extreme rain", B::Rain),
    Rule::new("freezing rain", B::Rain),
    Rule::new("light intensity shower rain", B::Rain),
    Rule::new("heavy intensity shower rain", B::Rain),
    Rule::new("ragged shower rain", B::Rain),
    Rule::new("light snow", B::Snow),
    Rule::new("heavy snow", B::Snow),
    Rule::new("sleet", B::Snow),
    Rule::new("light shower sleet", B::Snow),
    Rule::new("shower sleet", B::Snow),
    Rule::new("light rain and snow", B::Snow),
    Rule::new("rain and snow", B::Snow),
    Rule::new("light shower snow", B::Snow),
    Rule::new("shower snow", B::Snow),
    Rule::new("heavy shower snow", B::Snow),
];

pub static ICON_RULES: &[Rule<IconKind>] = &[
    Rule::new("clear sky", I::Sun),
    Rule::new("few clouds", I::CloudSun),
    Rule::new("scattered clouds", I::Cloud),
    Rule::new("broken clouds", I::Cloud),
    Rule::new("shower rain", I::CloudRain),
    Rule::new("rain", I::CloudSunRain),
    Rule::new("thunderstorm", I::CloudBolt),
    Rule::new("snow", I::CloudMeatball),
    Rule::new("mist", I::Smog),
    Rule::new("overcast clouds", I::Cloud),
    Rule::new("light rain", I::CloudRain),
    Rule::new("moderate rain", I::CloudRain),
    Rule::new("heavy intensity rain", I::CloudRain),
    Rule::new("very heavy rain", I::CloudRain),
    Rule::new("extreme rain", I::CloudRain),
    Rule::new("freezing rain", I::CloudMeatball),
    Rule::new("light intensity shower rain", I::CloudRain),
    Rule::new("heavy intensity shower rain", I::CloudRain),
    Rule::new("ragged shower rain", I::CloudRain),
    Rule::new("light snow", I::CloudMeatball),
    Rule::new("heavy snow", I::CloudMeatball),
    Rule::new("sleet", I::CloudMeatball),
    Rule::new("light shower sleet", I::CloudMeatball),
    Rule::new("shower sleet", I::CloudMeatball),
    Rule::new("light rain and snow", I::CloudMeatball),
    Rule::new("rain and snow", I::CloudMeatball),
    Rule::new("light shower snow", I::CloudMeatball),
    Rule::new("shower snow", I::CloudMeatball),
    Rule::new("heavy shower snow", I::CloudMeatball),
];

pub fn classify_background(description: &str) -> Option<BackgroundClass> {
    classify(BACKGROUND_RULES, description)
}

pub fn classify_icon(description: &str) -> Option<IconKind> {
    classify(ICON_RULES, description)
}

/// Exact-phrase icon lookup, used for forecast strip items.
pub fn lookup_icon(description: &str) -> Option<IconKind> {
    ICON_RULES
        .iter()
        .find(|rule| rule.phrase == description)
        .map(|rule| rule.category)
}

/// Displayed temperatures are always rounded up.
pub fn display_celsius(celsius: f64) -> i64 {
    celsius.ceil() as i64
}

pub fn celsius_to_fahrenheit(celsius: f64) -> i64 {
    (celsius * 9.0 / 5.0 + 32.0).ceil() as i64
}

/// Fahrenheit shown next to [`display_celsius`], converted from the rounded value
/// so the two readings agree.
pub fn display_fahrenheit(celsius: f64) -> i64 {
    celsius_to_fahrenheit(display_celsius(celsius) as f64)
}

/// e.g. `Today Jan 15 2024 Mon 13:00`
pub fn format_today(now: DateTime<Utc>, timezone: Tz) -> String {
    now.with_timezone(&timezone)
        .format("Today %b %-d %Y %a %H:%M")
        .to_string()
}

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MIDDAY_MARKER: &str = "12:00:00";
const FORECAST_DAYS: usize = 4;

/// Abbreviated weekday of a forecast timestamp; the raw text if it doesn't parse.
pub fn day_label(dt_txt: &str) -> String {
    NaiveDateTime::parse_from_str(dt_txt, DT_TXT_FORMAT)
        .map(|dt| dt.format("%a").to_string())
        .unwrap_or_else(|_| dt_txt.to_string())
}

/// Midday entries, skipping the first one (today), at most four.
pub fn select_forecast(raw: &RawForecast) -> Vec<ForecastEntry> {
    raw.list
        .iter()
        .filter(|item| item.dt_txt.contains(MIDDAY_MARKER))
        .skip(1)
        .take(FORECAST_DAYS)
        .map(|item| ForecastEntry {
            day_label: day_label(&item.dt_txt),
            temperature_c: item.main.temp,
            description: first_description(&item.weather),
        })
        .collect()
}

pub fn snapshot_from_raw(raw: &RawWeather, timezone: Tz) -> WeatherSnapshot {
    WeatherSnapshot {
        location_name: raw.name.clone(),
        temperature_c: raw.main.temp,
        temperature_min_c: raw.main.temp_min.unwrap_or(raw.main.temp),
        temperature_max_c: raw.main.temp_max.unwrap_or(raw.main.temp),
        description: first_description(&raw.weather),
        timezone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawCondition, RawForecastItem, RawMain};
    use chrono::{Duration, NaiveDate, TimeZone};

    #[test]
    fn fahrenheit_known_pairs() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32);
        assert_eq!(celsius_to_fahrenheit(20.0), 68);
        assert_eq!(celsius_to_fahrenheit(-5.0), 23);
        assert_eq!(celsius_to_fahrenheit(100.0), 212);
    }

    #[test]
    fn fahrenheit_rounds_up() {
        // 21.3 * 1.8 + 32 = 70.34
        assert_eq!(celsius_to_fahrenheit(21.3), 71);
        // -7.9 * 1.8 + 32 = 17.78
        assert_eq!(celsius_to_fahrenheit(-7.9), 18);
    }

    #[test]
    fn displayed_fahrenheit_follows_displayed_celsius() {
        // 7.2 shows as 8°C, and 8°C is 46.4°F
        assert_eq!(display_fahrenheit(7.2), 47);
        assert_eq!(display_fahrenheit(20.0), 68);
        // -5.5 shows as -5°C
        assert_eq!(display_fahrenheit(-5.5), 23);
    }

    #[test]
    fn celsius_rounds_up() {
        assert_eq!(display_celsius(12.01), 13);
        assert_eq!(display_celsius(12.0), 12);
        assert_eq!(display_celsius(-0.4), 0);
        assert_eq!(display_celsius(-3.6), -3);
    }

    #[test]
    fn light_rain_is_shadowed_by_rain() {
        assert_eq!(classify_background("light rain"), classify_background("rain"));
        assert_eq!(classify_background("light rain"), Some(BackgroundClass::Rain));
        assert_eq!(classify_icon("light rain"), Some(IconKind::CloudSunRain));
    }

    #[test]
    fn shower_rain_matches_before_rain() {
        assert_eq!(
            classify_background("light intensity shower rain"),
            Some(BackgroundClass::CloudRain)
        );
        assert_eq!(classify_icon("shower rain"), Some(IconKind::CloudRain));
    }

    #[test]
    fn snow_family() {
        assert_eq!(classify_background("light snow"), Some(BackgroundClass::Snow));
        // "rain" comes earlier in the table than "snow"
        assert_eq!(classify_background("rain and snow"), Some(BackgroundClass::Rain));
        assert_eq!(classify_icon("sleet"), Some(IconKind::CloudMeatball));
    }

    #[test]
    fn clouds_and_mist() {
        assert_eq!(classify_background("overcast clouds"), Some(BackgroundClass::Cloud));
        assert_eq!(classify_background("few clouds"), Some(BackgroundClass::CloudSun));
        assert_eq!(classify_background("mist"), Some(BackgroundClass::Smog));
        assert_eq!(classify_icon("clear sky"), Some(IconKind::Sun));
    }

    #[test]
    fn unmapped_description_yields_none() {
        assert_eq!(classify_background("haze"), None);
        assert_eq!(classify_icon("dust"), None);
        assert_eq!(classify_background(""), None);
    }

    #[test]
    fn class_names() {
        assert_eq!(BackgroundClass::default().as_str(), "sunny");
        assert_eq!(BackgroundClass::CloudRain.as_str(), "cloud-rain");
        assert_eq!(IconKind::CloudSunRain.as_str(), "cloud-sun-rain");
    }

    #[test]
    fn lookup_icon_is_exact() {
        assert_eq!(lookup_icon("light rain"), Some(IconKind::CloudRain));
        assert_eq!(lookup_icon("very light rain"), None);
    }

    #[test]
    fn tables_have_same_phrases_in_same_order() {
        let bg: Vec<_> = BACKGROUND_RULES.iter().map(|r| r.phrase).collect();
        let icons: Vec<_> = ICON_RULES.iter().map(|r| r.phrase).collect();
        assert_eq!(bg, icons);
        assert_eq!(bg.len(), 29);
    }

    #[test]
    fn today_in_city_timezone() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            format_today(now, chrono_tz::Europe::Zurich),
            "Today Jan 15 2024 Mon 13:00"
        );
        assert_eq!(
            format_today(now, chrono_tz::Pacific::Auckland),
            "Today Jan 16 2024 Tue 01:00"
        );
    }

    #[test]
    fn day_label_parses_dt_txt() {
        assert_eq!(day_label("2024-01-16 12:00:00"), "Tue");
        assert_eq!(day_label("garbage"), "garbage");
    }

    fn five_day_forecast() -> RawForecast {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let list = (0..40)
            .map(|i| {
                let at = start + Duration::hours(3 * i);
                RawForecastItem {
                    dt_txt: at.format(DT_TXT_FORMAT).to_string(),
                    main: RawMain { temp: i as f64 * 0.5, temp_min: None, temp_max: None },
                    weather: vec![RawCondition { description: format!("entry {i}") }],
                }
            })
            .collect();
        RawForecast { list }
    }

    #[test]
    fn forecast_keeps_midday_of_days_two_to_five() {
        let entries = select_forecast(&five_day_forecast());

        assert_eq!(entries.len(), 4);
        let labels: Vec<_> = entries.iter().map(|e| e.day_label.as_str()).collect();
        assert_eq!(labels, ["Tue", "Wed", "Thu", "Fri"]);
        // midday entries are every 8th starting at index 4; index 4 is today
        let descriptions: Vec<_> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, ["entry 12", "entry 20", "entry 28", "entry 36"]);
        assert_eq!(entries[0].temperature_c, 6.0);
    }

    #[test]
    fn forecast_short_list() {
        let mut raw = five_day_forecast();
        raw.list.truncate(10);
        assert!(select_forecast(&raw).is_empty());
    }

    #[test]
    fn snapshot_falls_back_to_temp_for_missing_range() {
        let raw = RawWeather {
            name: "Zurich".into(),
            main: RawMain { temp: 4.2, temp_min: Some(1.0), temp_max: None },
            weather: vec![RawCondition { description: "mist".into() }],
        };
        let snap = snapshot_from_raw(&raw, chrono_tz::Europe::Zurich);
        assert_eq!(snap.temperature_min_c, 1.0);
        assert_eq!(snap.temperature_max_c, 4.2);
        assert_eq!(snap.description, "mist");
        assert_eq!(snap.timezone, chrono_tz::Europe::Zurich);
    }
}
