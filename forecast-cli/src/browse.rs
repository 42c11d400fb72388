//! Interactive session driving the view model from prompts.

use std::fmt;

use chrono::Weekday;
use forecast_core::{
    Config, ForecastViewModel, Selection, TimeOfDay, ViewState,
    model::{WEEKDAYS, weekday_name},
    provider_from_config,
};
use inquire::{InquireError, Select, Text};
use tracing::debug;

use crate::{cli::today, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ChangeDay,
    ChangeTimeOfDay,
    NextWeek,
    PreviousWeek,
    ChangeLocation,
    Retry,
    Quit,
}

impl Action {
    fn available(state: ViewState) -> Vec<Action> {
        let mut actions = vec![
            Action::ChangeDay,
            Action::ChangeTimeOfDay,
            Action::NextWeek,
            Action::PreviousWeek,
            Action::ChangeLocation,
        ];
        if state == ViewState::Failed {
            actions.push(Action::Retry);
        }
        actions.push(Action::Quit);
        actions
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::ChangeDay => "Change day",
            Action::ChangeTimeOfDay => "Change time of day",
            Action::NextWeek => "Next week  →",
            Action::PreviousWeek => "←  Previous week",
            Action::ChangeLocation => "Change location",
            Action::Retry => "Retry",
            Action::Quit => "Quit",
        })
    }
}

/// Menu entry for the day picker: "Every Friday".
struct DayChoice(Weekday);

impl fmt::Display for DayChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Every {}", weekday_name(self.0))
    }
}

/// Esc / Ctrl-C end the session instead of surfacing as errors.
fn prompt<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn run(config: &Config, location: String) -> anyhow::Result<()> {
    let gateway = provider_from_config(config)?;
    let mut vm = ForecastViewModel::new(Selection::new(location));
    let mut slots = render::ChartSlots::new();

    if let Some(ticket) = vm.mount(today()) {
        vm.drive(gateway.as_ref(), ticket).await;
    }

    loop {
        print!("{}", render::view(&vm, &mut slots));

        let Some(action) = prompt(Select::new("What next?", Action::available(vm.state())).prompt())?
        else {
            break;
        };

        let ticket = match action {
            Action::ChangeDay => {
                let choices: Vec<DayChoice> = WEEKDAYS.into_iter().map(DayChoice).collect();
                let cursor = WEEKDAYS
                    .iter()
                    .position(|d| *d == vm.selection().weekday)
                    .unwrap_or_default();
                let Some(choice) =
                    prompt(Select::new("Day:", choices).with_starting_cursor(cursor).prompt())?
                else {
                    continue;
                };
                vm.select_weekday(choice.0, today())
            }
            Action::ChangeTimeOfDay => {
                let Some(time_of_day) =
                    prompt(Select::new("Time of day:", TimeOfDay::all().to_vec()).prompt())?
                else {
                    continue;
                };
                vm.select_time_of_day(time_of_day);
                None
            }
            Action::NextWeek => vm.shift_week(1, today()),
            Action::PreviousWeek => vm.shift_week(-1, today()),
            Action::ChangeLocation => {
                let current = vm.selection().location.clone();
                let Some(location) =
                    prompt(Text::new("Location:").with_default(&current).prompt())?
                else {
                    continue;
                };
                vm.edit_location(location.trim());
                Some(vm.confirm_location(today()))
            }
            Action::Retry => Some(vm.confirm_location(today())),
            Action::Quit => break,
        };

        match ticket {
            Some(ticket) => {
                vm.drive(gateway.as_ref(), ticket).await;
            }
            None => debug!(?action, "no fetch needed"),
        }
    }

    Ok(())
}
