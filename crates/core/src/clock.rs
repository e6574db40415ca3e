use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use serde::Serialize;

pub const DEFAULT_TIMEZONE: &str = "UTC";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local wall-clock time at second precision, as stamped on reports.
    fn local_timestamp(&self) -> String {
        self.now().with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    #[default]
    Full,
    Date,
    Time,
    DateTime,
}

impl DateFormat {
    pub fn parse_selector(selector: &str) -> Option<Self> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "datetime" => Some(Self::DateTime),
            _ => None,
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::Full => "%Y-%m-%d %H:%M:%S %Z",
            Self::Date => "%Y-%m-%d",
            Self::Time => "%H:%M:%S %Z",
            Self::DateTime => "%Y-%m-%d %H:%M:%S",
        }
    }

    fn label(&self, zone: &str, rendered: &str) -> String {
        match self {
            Self::Full | Self::Time => format!("Current {zone} time: {rendered}"),
            Self::Date => format!("Current {zone} date: {rendered}"),
            Self::DateTime => format!("Current {zone}: {rendered}"),
        }
    }
}

/// A substituted input, reported alongside the reading instead of failing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "fallback", rename_all = "snake_case")]
pub enum InputFallback {
    UnknownTimezone { requested: String, used: String },
    UnknownFormat { requested: String, used: DateFormat },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DateReading {
    pub text: String,
    pub timezone: String,
    pub format: DateFormat,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<InputFallback>,
}

/// Exact IANA names first, then a case-insensitive match (`us/eastern`).
pub fn resolve_timezone(name: &str) -> Option<Tz> {
    let name = name.trim();
    name.parse::<Tz>().ok().or_else(|| Tz::from_str_insensitive(name).ok())
}

/// Current time in `zone_name`, rendered per `selector`. Unknown zones fall
/// back to UTC and unknown selectors to the full rendering; both are named
/// in the returned text.
pub fn read_date(clock: &dyn Clock, zone_name: &str, selector: &str) -> DateReading {
    let mut fallbacks = Vec::new();

    let zone = match resolve_timezone(zone_name) {
        Some(zone) => zone,
        None => {
            fallbacks.push(InputFallback::UnknownTimezone {
                requested: zone_name.to_string(),
                used: DEFAULT_TIMEZONE.to_string(),
            });
            chrono_tz::UTC
        }
    };

    let format = match DateFormat::parse_selector(selector) {
        Some(format) => format,
        None => {
            fallbacks
                .push(InputFallback::UnknownFormat { requested: selector.to_string(), used: DateFormat::Full });
            DateFormat::Full
        }
    };

    let format_fell_back =
        fallbacks.iter().any(|fallback| matches!(fallback, InputFallback::UnknownFormat { .. }));
    let zone_fell_back =
        fallbacks.iter().any(|fallback| matches!(fallback, InputFallback::UnknownTimezone { .. }));
    // A UTC substitute is always shown in full so the zone is visible.
    let format = if zone_fell_back { DateFormat::Full } else { format };

    let now = clock.now().with_timezone(&zone);
    let rendered = now.format(format.pattern()).to_string();

    let text = if zone_fell_back {
        let mut text = format!("Unknown timezone: {zone_name}. Using UTC instead: {rendered}");
        if format_fell_back {
            text.push_str(&format!(" (invalid format `{selector}`, using full)"));
        }
        text
    } else if format_fell_back {
        format!("Invalid format specified ({selector}). Using default: {rendered}")
    } else {
        format.label(zone.name(), &rendered)
    };

    let timezone = if zone_fell_back { DEFAULT_TIMEZONE.to_string() } else { zone.name().to_string() };

    DateReading { text, timezone, format, fallbacks }
}
