//! Text output for the two day cards and their charts.

use forecast_core::{
    ChartData, ChartSlot, ConditionKind, DailySummary, ForecastBundle, ForecastViewModel,
    UnitSystem, ViewState, model::weekday_name,
};

/// One chart slot per card.
#[derive(Debug)]
pub struct ChartSlots {
    primary: ChartSlot,
    secondary: ChartSlot,
}

impl ChartSlots {
    pub fn new() -> Self {
        Self {
            primary: ChartSlot::new("primary"),
            secondary: ChartSlot::new("secondary"),
        }
    }

    fn clear(&mut self) {
        self.primary.clear();
        self.secondary.clear();
    }
}

impl Default for ChartSlots {
    fn default() -> Self {
        Self::new()
    }
}

/// Render everything the view model currently exposes.
pub fn view(vm: &ForecastViewModel, slots: &mut ChartSlots) -> String {
    let selection = vm.selection();

    let mut out = format!(
        "\n== {} | every {} | {} | week +{} ==\n",
        selection.location,
        weekday_name(selection.weekday),
        selection.time_of_day,
        selection.week_offset
    );

    match vm.state() {
        ViewState::Idle => out.push_str("Nothing fetched yet.\n"),
        ViewState::Fetching => out.push_str("Fetching forecast...\n"),
        ViewState::Ready => {}
        ViewState::Failed => {
            if let Some(msg) = vm.error_message() {
                out.push_str(&format!("! {msg}\n"));
            }
            if let Some(err) = vm.last_error() {
                out.push_str(&format!("  ({err})\n"));
            }
            if vm.is_stale() {
                out.push_str("  Showing the last forecast that loaded.\n");
            }
        }
    }

    let Some(bundle) = vm.bundle() else {
        slots.clear();
        return out;
    };

    write_bundle(&mut out, vm, bundle, slots);
    out
}

fn write_bundle(
    out: &mut String,
    vm: &ForecastViewModel,
    bundle: &ForecastBundle,
    slots: &mut ChartSlots,
) {
    let units = bundle.unit_system;
    let time_of_day = vm.selection().time_of_day;

    out.push_str(&bundle.resolved_address);
    out.push('\n');

    if let Some(current) = &bundle.current {
        out.push_str(&format!(
            "Now{}: {} {:.0}{}, wind {:.0} {}\n",
            current
                .observed_at
                .as_deref()
                .map(|t| format!(" ({t})"))
                .unwrap_or_default(),
            current.conditions,
            current.temperature,
            units.temperature_unit(),
            current.wind,
            units.speed_unit(),
        ));
    }

    let (primary_heading, secondary_heading) = vm.headings().unwrap_or_default();

    out.push_str(&format!("\n{primary_heading}\n"));
    out.push_str(&card(&bundle.primary.summary, units));
    let chart = slots.primary.show(ChartData::from_series(
        &bundle.primary.hourly,
        time_of_day,
        units,
    ));
    out.push_str(chart.surface());

    out.push_str(&format!("\n{secondary_heading}\n"));
    out.push_str(&card(&bundle.secondary.summary, units));
    let chart = slots.secondary.show(ChartData::from_series(
        &bundle.secondary.hourly,
        time_of_day,
        units,
    ));
    out.push_str(chart.surface());
}

/// Summary card: conditions and temperature, wind, rounded rain chance.
pub fn card(summary: &DailySummary, units: UnitSystem) -> String {
    let glyph = ConditionKind::classify(&summary.conditions).glyph();

    format!(
        "{glyph} {} {:.0}{}\n  wind {:.0} {}\n  {:.0}% chance rain\n",
        summary.conditions,
        summary.temperature,
        units.temperature_unit(),
        summary.wind,
        units.speed_unit(),
        summary.rain_chance.round(),
    )
}
