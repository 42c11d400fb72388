//! Line-chart data for one day and the display slots that hold drawn charts.
//!
//! A [`ChartSlot`] owns at most one [`Chart`]. Showing new data releases the
//! old chart first; clearing or dropping the slot releases it as well.

use tracing::debug;

use crate::model::{HourlySeries, TimeOfDay, UnitSystem};

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// X-axis title, the period name.
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    pub fn from_series(series: &HourlySeries, time_of_day: TimeOfDay, units: UnitSystem) -> Self {
        let projected = series.project(time_of_day);

        Self {
            title: time_of_day.to_string(),
            labels: projected.labels,
            datasets: vec![
                Dataset {
                    label: format!("Temperature ({})", units.temperature_unit()),
                    values: projected.temperature,
                },
                Dataset {
                    label: "Precipitation Probability".to_string(),
                    values: projected.precip_prob,
                },
                Dataset {
                    label: format!("Wind Speed ({})", units.speed_unit()),
                    values: projected.wind_speed,
                },
            ],
        }
    }

    /// Plain-text table: one column per hour, one row per dataset.
    pub fn render_table(&self) -> String {
        const CELL: usize = 7;

        let label_width = self
            .datasets
            .iter()
            .map(|d| d.label.chars().count())
            .max()
            .unwrap_or_default();

        let mut out = format!("{:label_width$}  {}\n", "", self.title);

        out.push_str(&format!("{:label_width$}", ""));
        for label in &self.labels {
            out.push_str(&format!("{label:>CELL$}"));
        }
        out.push('\n');

        for dataset in &self.datasets {
            out.push_str(&format!("{:label_width$}", dataset.label));
            for value in &dataset.values {
                // `{:.0}` alone rounds ties to even; cards round half away from zero.
                let cell = match value {
                    Some(v) => format!("{:>CELL$.0}", v.round()),
                    None => format!("{:>CELL$}", "-"),
                };
                out.push_str(&cell);
            }
            out.push('\n');
        }

        out
    }
}

/// A drawn chart. Lives until its slot replaces or clears it.
#[derive(Debug)]
pub struct Chart {
    slot: String,
    serial: u64,
    data: ChartData,
    surface: String,
}

impl Chart {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    /// The rendered text surface.
    pub fn surface(&self) -> &str {
        &self.surface
    }
}

impl Drop for Chart {
    fn drop(&mut self) {
        debug!(slot = %self.slot, serial = self.serial, "chart released");
    }
}

#[derive(Debug)]
pub struct ChartSlot {
    name: String,
    current: Option<Chart>,
    created: u64,
    released: u64,
}

impl ChartSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: None,
            created: 0,
            released: 0,
        }
    }

    /// Release whatever is showing, then draw `data`.
    pub fn show(&mut self, data: ChartData) -> &Chart {
        self.clear();

        self.created += 1;
        let surface = data.render_table();
        debug!(slot = %self.name, serial = self.created, "chart created");

        self.current.insert(Chart {
            slot: self.name.clone(),
            serial: self.created,
            data,
            surface,
        })
    }

    pub fn clear(&mut self) {
        if let Some(chart) = self.current.take() {
            self.released += 1;
            drop(chart);
        }
    }

    pub fn current(&self) -> Option<&Chart> {
        self.current.as_ref()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn released(&self) -> u64 {
        self.released
    }
}

impl Drop for ChartSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> HourlySeries {
        HourlySeries {
            temperature: (0..24).map(|h| 70.0 + f64::from(h)).collect(),
            precip_prob: (0..24).map(|h| f64::from(h) + 0.4).collect(),
            wind_speed: vec![12.0; 24],
        }
    }

    #[test]
    fn chart_data_labels_follow_units() {
        let data = ChartData::from_series(&series(), TimeOfDay::Evening, UnitSystem::Metric);

        assert_eq!(data.title, "evening");
        assert_eq!(data.labels, vec!["5:00", "6:00", "7:00", "8:00"]);
        assert_eq!(data.datasets[0].label, "Temperature (°C)");
        assert_eq!(data.datasets[2].label, "Wind Speed (km/h)");
        assert_eq!(
            data.datasets[0].values,
            vec![Some(87.0), Some(88.0), Some(89.0), Some(90.0)]
        );
    }

    #[test]
    fn table_rounds_precipitation_and_marks_gaps() {
        let mut data = ChartData::from_series(&series(), TimeOfDay::Morning, UnitSystem::Us);
        data.datasets[1].values[0] = None;

        let table = data.render_table();

        assert!(table.contains("morning"));
        assert!(table.contains("8:00"));
        assert!(table.contains("11:00"));
        assert!(table.contains("Temperature (°F)"));
        assert!(table.contains("78"));
        // 9.4 -> 9, and the gap at 8:00 is drawn as a dash.
        assert!(table.contains("      9"));
        assert!(table.contains("      -"));
    }

    #[test]
    fn table_rounds_half_chances_up_like_the_card() {
        let mut hourly = series();
        hourly.precip_prob = vec![42.5; 24];
        let data = ChartData::from_series(&hourly, TimeOfDay::Morning, UnitSystem::Us);

        let table = data.render_table();
        let row = table
            .lines()
            .find(|l| l.starts_with("Precipitation Probability"))
            .expect("precipitation row");

        assert!(row.ends_with("     43     43     43     43"), "{row}");
        assert!(!row.contains("42"));
    }

    #[test]
    fn showing_new_data_releases_previous_chart() {
        let mut slot = ChartSlot::new("primary");
        assert!(slot.current().is_none());

        let first = slot
            .show(ChartData::from_series(&series(), TimeOfDay::Morning, UnitSystem::Us))
            .serial();
        assert_eq!(slot.released(), 0);

        let second = slot
            .show(ChartData::from_series(&series(), TimeOfDay::Evening, UnitSystem::Us))
            .serial();

        assert_ne!(first, second);
        assert_eq!(slot.created(), 2);
        assert_eq!(slot.released(), 1);
        assert_eq!(slot.current().unwrap().data().title, "evening");
    }

    #[test]
    fn clear_releases_once() {
        let mut slot = ChartSlot::new("secondary");
        slot.show(ChartData::from_series(&series(), TimeOfDay::Afternoon, UnitSystem::Us));

        slot.clear();
        slot.clear();

        assert!(slot.current().is_none());
        assert_eq!(slot.released(), 1);
    }

    #[test]
    fn surface_matches_rendered_table() {
        let mut slot = ChartSlot::new("primary");
        let data = ChartData::from_series(&series(), TimeOfDay::Afternoon, UnitSystem::Us);
        let expected = data.render_table();

        let chart = slot.show(data);
        assert_eq!(chart.surface(), expected);
    }
}
