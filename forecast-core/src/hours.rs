//! Hour-of-day buckets for the morning / afternoon / evening charts.

use crate::model::{HourlySeries, TimeOfDay};

const MORNING: &[u32] = &[8, 9, 10, 11];
const AFTERNOON: &[u32] = &[12, 13, 14, 15, 16];
const EVENING: &[u32] = &[17, 18, 19, 20];

impl TimeOfDay {
    /// Clock hours charted for this period, in display order.
    pub fn hours(&self) -> &'static [u32] {
        match self {
            TimeOfDay::Morning => MORNING,
            TimeOfDay::Afternoon => AFTERNOON,
            TimeOfDay::Evening => EVENING,
        }
    }
}

/// Same table keyed by the exact lowercase name. Anything else gets no hours
/// (an empty chart).
pub fn hours_for_period(name: &str) -> &'static [u32] {
    TimeOfDay::all()
        .iter()
        .find(|tod| tod.as_str() == name)
        .map(|tod| tod.hours())
        .unwrap_or_default()
}

/// Pick `values[h]` for every `h` in `hours`, keeping order.
///
/// An hour outside the series yields `None` so the result always has one
/// entry per requested hour.
pub fn project(values: &[f64], hours: &[u32]) -> Vec<Option<f64>> {
    hours
        .iter()
        .map(|&h| values.get(h as usize).copied())
        .collect()
}

/// 12-hour clock label without AM/PM: 0 -> "12:00", 13 -> "1:00".
pub fn hour_label(hour: u32) -> String {
    let h = hour % 12;
    format!("{}:00", if h == 0 { 12 } else { h })
}

/// One day's hourly values cut down to a single period.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSeries {
    pub time_of_day: TimeOfDay,
    pub hours: Vec<u32>,
    pub labels: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub precip_prob: Vec<Option<f64>>,
    pub wind_speed: Vec<Option<f64>>,
}

impl HourlySeries {
    pub fn project(&self, time_of_day: TimeOfDay) -> ProjectedSeries {
        let hours = time_of_day.hours();

        ProjectedSeries {
            time_of_day,
            hours: hours.to_vec(),
            labels: hours.iter().map(|&h| hour_label(h)).collect(),
            temperature: project(&self.temperature, hours),
            precip_prob: project(&self.precip_prob, hours),
            wind_speed: project(&self.wind_speed, hours),
        }
    }
}
