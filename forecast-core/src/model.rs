use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unit system sent to the provider as `unitGroup`.
///
/// Chosen once in configuration; every request and every label uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    #[serde(alias = "imperial")]
    Us,
    Metric,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Us => "us",
            UnitSystem::Metric => "metric",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Us, UnitSystem::Metric]
    }

    pub fn temperature_unit(&self) -> &'static str {
        match self {
            UnitSystem::Us => "°F",
            UnitSystem::Metric => "°C",
        }
    }

    pub fn speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Us => "mph",
            UnitSystem::Metric => "km/h",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "us" | "imperial" => Ok(UnitSystem::Us),
            "metric" => Ok(UnitSystem::Metric),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported unit systems: us, metric."
            )),
        }
    }
}

/// Named part of the day whose hours are charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeOfDay {
    #[default]
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }

    pub const fn all() -> &'static [TimeOfDay] {
        &[TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening]
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            _ => Err(anyhow::anyhow!(
                "Unknown time of day '{value}'. Expected morning, afternoon or evening."
            )),
        }
    }
}

/// Weekdays in the order the day picker lists them.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Full English name, e.g. "Friday".
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a full or three-letter weekday name, ignoring case.
pub fn parse_weekday(value: &str) -> anyhow::Result<Weekday> {
    value.trim().parse::<Weekday>().map_err(|_| {
        anyhow::anyhow!("Unknown weekday '{value}'. Expected a name like 'Friday' or 'fri'.")
    })
}

/// The user's current choice of what to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub location: String,
    pub weekday: Weekday,
    pub time_of_day: TimeOfDay,
    pub week_offset: u32,
}

impl Selection {
    pub const MAX_WEEK_OFFSET: u32 = 30;

    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Move the week offset by `delta` weeks.
    ///
    /// Returns `false` and leaves the offset untouched when the result would
    /// leave `0..=MAX_WEEK_OFFSET`.
    pub fn shift_week(&mut self, delta: i32) -> bool {
        let Ok(next) = u32::try_from(i64::from(self.week_offset) + i64::from(delta)) else {
            return false;
        };
        if delta == 0 || next > Self::MAX_WEEK_OFFSET {
            return false;
        }
        self.week_offset = next;
        true
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            location: "Manhattan".to_string(),
            weekday: Weekday::Fri,
            time_of_day: TimeOfDay::Morning,
            week_offset: 0,
        }
    }
}

/// The two calendar dates one fetch covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub primary: NaiveDate,
    pub secondary: NaiveDate,
}

impl DateWindow {
    pub fn primary_str(&self) -> String {
        self.primary.format("%Y-%m-%d").to_string()
    }

    pub fn secondary_str(&self) -> String {
        self.secondary.format("%Y-%m-%d").to_string()
    }
}

/// Rough category of a free-text conditions label, used for the card glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Sunny,
    Cloudy,
    Rainy,
    Other,
}

impl ConditionKind {
    /// Classify by the first comma-separated part of a label such as
    /// "Rain, Partially cloudy".
    pub fn classify(conditions: &str) -> Self {
        let first = conditions
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if first.contains("sunny") || first.contains("clear") {
            ConditionKind::Sunny
        } else if first.contains("cloudy") || first.contains("overcast") {
            ConditionKind::Cloudy
        } else if first.contains("rain") {
            ConditionKind::Rainy
        } else {
            ConditionKind::Other
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ConditionKind::Sunny => "☀",
            ConditionKind::Cloudy => "☁",
            ConditionKind::Rainy => "☂",
            ConditionKind::Other => " ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub temperature: f64,
    pub wind: f64,
    pub conditions: String,
    /// Precipitation probability, 0-100, unrounded.
    pub rain_chance: f64,
}

/// Hourly values for one day, indexed by hour of day (0-23).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    pub temperature: Vec<f64>,
    pub precip_prob: Vec<f64>,
    pub wind_speed: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub summary: DailySummary,
    pub hourly: HourlySeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub observed_at: Option<String>,
    pub temperature: f64,
    pub wind: f64,
    pub conditions: String,
    pub rain_chance: f64,
}

/// Everything one fetch cycle produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub resolved_address: String,
    pub unit_system: UnitSystem,
    pub primary: DayForecast,
    pub secondary: DayForecast,
    pub current: Option<CurrentConditions>,
}
