//! Selection, fetch lifecycle and the latest forecast, in one place.
//!
//! Every selection change that needs new data hands back a [`FetchTicket`].
//! The caller runs the ticket against a gateway (or calls [`ForecastViewModel::drive`])
//! and passes the result to [`ForecastViewModel::complete`]. Only the most
//! recently issued ticket may change state; older completions are dropped.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, info, warn};

use crate::{
    dates,
    error::GatewayError,
    hours::ProjectedSeries,
    model::{DateWindow, ForecastBundle, Selection, TimeOfDay},
    provider::ForecastGateway,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Fetching,
    Ready,
    Failed,
}

/// One issued fetch: what to ask for and which generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    location: String,
    window: DateWindow,
    today: NaiveDate,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    /// The date the window was resolved against.
    pub fn today(&self) -> NaiveDate {
        self.today
    }
}

#[derive(Debug)]
pub struct ForecastViewModel {
    selection: Selection,
    state: ViewState,
    bundle: Option<ForecastBundle>,
    last_error: Option<GatewayError>,
    today: Option<NaiveDate>,
    issued: u64,
}

impl ForecastViewModel {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            state: ViewState::Idle,
            bundle: None,
            last_error: None,
            today: None,
            issued: 0,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Latest successful bundle. Still available after a failed refresh.
    pub fn bundle(&self) -> Option<&ForecastBundle> {
        self.bundle.as_ref()
    }

    pub fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref()
    }

    /// Message for the failure banner, only while in `Failed`.
    pub fn error_message(&self) -> Option<&'static str> {
        match (self.state, &self.last_error) {
            (ViewState::Failed, Some(err)) => Some(err.user_message()),
            _ => None,
        }
    }

    /// True when the shown bundle predates a failed refresh.
    pub fn is_stale(&self) -> bool {
        self.state == ViewState::Failed && self.bundle.is_some()
    }

    /// The "today" the held bundle was resolved against.
    pub fn today(&self) -> Option<NaiveDate> {
        self.today
    }

    /// First fetch. Does nothing unless the model is still `Idle`.
    pub fn mount(&mut self, today: NaiveDate) -> Option<FetchTicket> {
        (self.state == ViewState::Idle).then(|| self.begin_fetch(today))
    }

    /// Change the location text without fetching (the user is still typing).
    pub fn edit_location(&mut self, location: impl Into<String>) {
        self.selection.location = location.into();
    }

    /// The user confirmed the typed location.
    pub fn confirm_location(&mut self, today: NaiveDate) -> FetchTicket {
        self.begin_fetch(today)
    }

    pub fn set_location(&mut self, location: impl Into<String>, today: NaiveDate) -> FetchTicket {
        self.edit_location(location);
        self.confirm_location(today)
    }

    /// Returns `None` when the weekday is already selected.
    pub fn select_weekday(&mut self, weekday: Weekday, today: NaiveDate) -> Option<FetchTicket> {
        if self.selection.weekday == weekday && self.state != ViewState::Idle {
            return None;
        }
        self.selection.weekday = weekday;
        Some(self.begin_fetch(today))
    }

    /// Move forward or back by `delta` weeks. Out-of-range moves are ignored
    /// and return `None`.
    pub fn shift_week(&mut self, delta: i32, today: NaiveDate) -> Option<FetchTicket> {
        if !self.selection.shift_week(delta) {
            debug!(
                delta,
                week_offset = self.selection.week_offset,
                "week shift out of range, ignored"
            );
            return None;
        }
        Some(self.begin_fetch(today))
    }

    /// Switch the charted period. The full day is already held, so no fetch.
    pub fn select_time_of_day(&mut self, time_of_day: TimeOfDay) {
        self.selection.time_of_day = time_of_day;
    }

    /// Window the current selection resolves to for `today`.
    pub fn window_for(&self, today: NaiveDate) -> DateWindow {
        dates::resolve(today, self.selection.weekday, self.selection.week_offset)
    }

    fn begin_fetch(&mut self, today: NaiveDate) -> FetchTicket {
        self.issued += 1;
        self.state = ViewState::Fetching;

        let ticket = FetchTicket {
            generation: self.issued,
            location: self.selection.location.clone(),
            window: self.window_for(today),
            today,
        };

        debug!(
            generation = ticket.generation,
            location = %ticket.location,
            primary = %ticket.window.primary,
            "fetch issued"
        );

        ticket
    }

    /// Apply a finished fetch. Returns `false` if the ticket was superseded
    /// and the result was discarded.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ForecastBundle, GatewayError>,
    ) -> bool {
        if ticket.generation != self.issued {
            debug!(
                generation = ticket.generation,
                latest = self.issued,
                "discarding stale fetch result"
            );
            return false;
        }

        match result {
            Ok(bundle) => {
                info!(
                    location = %bundle.resolved_address,
                    primary = %bundle.primary.summary.date,
                    "forecast updated"
                );
                self.bundle = Some(bundle);
                self.today = Some(ticket.today);
                self.last_error = None;
                self.state = ViewState::Ready;
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "forecast fetch failed");
                self.last_error = Some(err);
                self.state = ViewState::Failed;
            }
        }

        true
    }

    /// Run `ticket` against `gateway` and apply the result.
    pub async fn drive(&mut self, gateway: &dyn ForecastGateway, ticket: FetchTicket) -> bool {
        let result = gateway.fetch(&ticket.location, &ticket.window).await;
        self.complete(&ticket, result)
    }

    pub fn primary_projection(&self) -> Option<ProjectedSeries> {
        self.bundle
            .as_ref()
            .map(|b| b.primary.hourly.project(self.selection.time_of_day))
    }

    pub fn secondary_projection(&self) -> Option<ProjectedSeries> {
        self.bundle
            .as_ref()
            .map(|b| b.secondary.hourly.project(self.selection.time_of_day))
    }

    /// Card headings for the held bundle, e.g. ("This Friday the 8th", "Friday the 15th").
    ///
    /// Uses the bundle's own dates so a stale bundle keeps matching headings.
    pub fn headings(&self) -> Option<(String, String)> {
        let bundle = self.bundle.as_ref()?;
        let today = self.today?;

        let primary = bundle.primary.summary.date;
        let secondary = bundle.secondary.summary.date;

        Some((
            dates::primary_heading(primary, today, primary.weekday()),
            dates::secondary_heading(secondary, today, secondary.weekday()),
        ))
    }
}

impl Default for ForecastViewModel {
    fn default() -> Self {
        Self::new(Selection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DailySummary, DayForecast, HourlySeries, UnitSystem};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn today() -> NaiveDate {
        // Wednesday
        date(2024, 3, 6)
    }

    fn day(date: NaiveDate, base: f64) -> DayForecast {
        DayForecast {
            summary: DailySummary {
                date,
                temperature: base,
                wind: 5.0,
                conditions: "Clear".into(),
                rain_chance: 10.0,
            },
            hourly: HourlySeries {
                temperature: (0..24).map(|h| base + f64::from(h)).collect(),
                precip_prob: vec![0.0; 24],
                wind_speed: vec![3.0; 24],
            },
        }
    }

    fn bundle_for(window: &DateWindow, base: f64) -> ForecastBundle {
        ForecastBundle {
            resolved_address: "Manhattan, NY, United States".into(),
            unit_system: UnitSystem::Us,
            primary: day(window.primary, base),
            secondary: day(window.secondary, base),
            current: None,
        }
    }

    fn malformed() -> GatewayError {
        GatewayError::MalformedResponse("expected at least 8 days, got 5".into())
    }

    #[derive(Debug, Default)]
    struct ScriptedGateway {
        responses: Mutex<Vec<Result<f64, String>>>,
        calls: Mutex<Vec<(String, DateWindow)>>,
    }

    #[async_trait]
    impl ForecastGateway for ScriptedGateway {
        async fn fetch(
            &self,
            location: &str,
            window: &DateWindow,
        ) -> Result<ForecastBundle, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((location.to_string(), *window));

            match self.responses.lock().unwrap().remove(0) {
                Ok(base) => Ok(bundle_for(window, base)),
                Err(msg) => Err(GatewayError::InvalidLocation(msg)),
            }
        }
    }

    #[test]
    fn starts_idle_and_mount_fetches_once() {
        let mut vm = ForecastViewModel::default();
        assert_eq!(vm.state(), ViewState::Idle);

        let ticket = vm.mount(today()).expect("first mount fetches");
        assert_eq!(vm.state(), ViewState::Fetching);
        assert_eq!(ticket.location(), "Manhattan");
        assert_eq!(ticket.window().primary, date(2024, 3, 8));
        assert_eq!(ticket.window().secondary, date(2024, 3, 15));

        assert!(vm.mount(today()).is_none());
    }

    #[test]
    fn success_moves_to_ready() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();

        assert!(vm.complete(&ticket, Ok(bundle_for(ticket.window(), 70.0))));

        assert_eq!(vm.state(), ViewState::Ready);
        assert!(vm.bundle().is_some());
        assert!(vm.error_message().is_none());
        assert!(!vm.is_stale());
    }

    #[test]
    fn failure_keeps_previous_bundle() {
        let mut vm = ForecastViewModel::default();
        let first = vm.mount(today()).unwrap();
        vm.complete(&first, Ok(bundle_for(first.window(), 70.0)));

        let second = vm.select_weekday(Weekday::Sat, today()).unwrap();
        assert!(vm.complete(&second, Err(malformed())));

        assert_eq!(vm.state(), ViewState::Failed);
        assert!(vm.is_stale());
        assert_eq!(
            vm.bundle().unwrap().primary.summary.date,
            date(2024, 3, 8)
        );
        assert!(matches!(
            vm.last_error(),
            Some(GatewayError::MalformedResponse(_))
        ));
        assert!(vm.error_message().is_some());
    }

    #[test]
    fn failure_without_previous_bundle_has_nothing_to_show() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        vm.complete(&ticket, Err(malformed()));

        assert_eq!(vm.state(), ViewState::Failed);
        assert!(vm.bundle().is_none());
        assert!(!vm.is_stale());
        assert!(vm.primary_projection().is_none());
    }

    #[test]
    fn recovery_after_failure_clears_error() {
        let mut vm = ForecastViewModel::default();
        let first = vm.mount(today()).unwrap();
        vm.complete(&first, Err(malformed()));

        let retry = vm.confirm_location(today());
        vm.complete(&retry, Ok(bundle_for(retry.window(), 60.0)));

        assert_eq!(vm.state(), ViewState::Ready);
        assert!(vm.last_error().is_none());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut vm = ForecastViewModel::default();
        let _ = vm.mount(today()).unwrap();

        let slow = vm.select_weekday(Weekday::Mon, today()).unwrap();
        let fast = vm.select_weekday(Weekday::Tue, today()).unwrap();
        assert!(fast.generation() > slow.generation());

        assert!(vm.complete(&fast, Ok(bundle_for(fast.window(), 50.0))));
        assert!(!vm.complete(&slow, Ok(bundle_for(slow.window(), 90.0))));

        assert_eq!(vm.state(), ViewState::Ready);
        assert_eq!(
            vm.bundle().unwrap().primary.summary.date,
            date(2024, 3, 12)
        );
    }

    #[test]
    fn stale_failure_does_not_flip_state() {
        let mut vm = ForecastViewModel::default();
        let old = vm.mount(today()).unwrap();
        let new = vm.confirm_location(today());

        assert!(!vm.complete(&old, Err(malformed())));
        assert_eq!(vm.state(), ViewState::Fetching);

        vm.complete(&new, Ok(bundle_for(new.window(), 70.0)));
        assert_eq!(vm.state(), ViewState::Ready);
    }

    #[test]
    fn time_of_day_change_never_fetches() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        vm.complete(&ticket, Ok(bundle_for(ticket.window(), 70.0)));

        vm.select_time_of_day(TimeOfDay::Evening);

        assert_eq!(vm.state(), ViewState::Ready);
        let projected = vm.primary_projection().unwrap();
        assert_eq!(
            projected.temperature,
            vec![Some(87.0), Some(88.0), Some(89.0), Some(90.0)]
        );
        assert_eq!(projected.labels, vec!["5:00", "6:00", "7:00", "8:00"]);
    }

    #[test]
    fn same_weekday_does_not_refetch() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        vm.complete(&ticket, Ok(bundle_for(ticket.window(), 70.0)));

        assert!(vm.select_weekday(Weekday::Fri, today()).is_none());
        assert_eq!(vm.state(), ViewState::Ready);
    }

    #[test]
    fn week_shift_clamps_and_refetches() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        vm.complete(&ticket, Ok(bundle_for(ticket.window(), 70.0)));

        assert!(vm.shift_week(-1, today()).is_none());
        assert_eq!(vm.selection().week_offset, 0);
        assert_eq!(vm.state(), ViewState::Ready);

        let next = vm.shift_week(1, today()).expect("forward shift fetches");
        assert_eq!(vm.selection().week_offset, 1);
        assert_eq!(next.window().primary, date(2024, 3, 15));
        assert_eq!(vm.state(), ViewState::Fetching);

        for _ in 0..29 {
            vm.shift_week(1, today());
        }
        assert_eq!(vm.selection().week_offset, 30);
        assert!(vm.shift_week(1, today()).is_none());
        assert_eq!(vm.selection().week_offset, 30);
    }

    #[test]
    fn editing_location_waits_for_confirmation() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        vm.complete(&ticket, Ok(bundle_for(ticket.window(), 70.0)));

        vm.edit_location("Lis");
        assert_eq!(vm.state(), ViewState::Ready);

        vm.edit_location("Lisbon");
        let confirmed = vm.confirm_location(today());
        assert_eq!(confirmed.location(), "Lisbon");
        assert_eq!(vm.state(), ViewState::Fetching);
    }

    #[test]
    fn headings_describe_held_bundle() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        vm.complete(&ticket, Ok(bundle_for(ticket.window(), 70.0)));

        let (primary, secondary) = vm.headings().unwrap();
        assert_eq!(primary, "This Friday the 8th");
        assert_eq!(secondary, "Friday the 15th");
    }

    #[test]
    fn failed_refresh_keeps_headings_of_held_bundle() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        vm.complete(&ticket, Ok(bundle_for(ticket.window(), 70.0)));

        // Two days later the refresh fails; the old bundle stays on screen.
        let later = date(2024, 3, 8);
        let retry = vm.confirm_location(later);
        assert_eq!(retry.today(), later);
        vm.complete(&retry, Err(malformed()));

        assert_eq!(vm.today(), Some(today()));
        let (primary, secondary) = vm.headings().unwrap();
        assert_eq!(primary, "This Friday the 8th");
        assert_eq!(secondary, "Friday the 15th");
    }

    #[test]
    fn discarded_result_does_not_move_today() {
        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        vm.complete(&ticket, Ok(bundle_for(ticket.window(), 70.0)));

        let slow = vm.confirm_location(date(2024, 3, 7));
        let _fast = vm.confirm_location(date(2024, 3, 8));
        assert!(!vm.complete(&slow, Ok(bundle_for(slow.window(), 60.0))));

        assert_eq!(vm.today(), Some(today()));
    }

    #[tokio::test]
    async fn drive_runs_ticket_against_gateway() {
        let gateway = ScriptedGateway {
            responses: Mutex::new(vec![Ok(70.0), Err("Atlantis".into())]),
            ..ScriptedGateway::default()
        };

        let mut vm = ForecastViewModel::default();
        let ticket = vm.mount(today()).unwrap();
        assert!(vm.drive(&gateway, ticket).await);
        assert_eq!(vm.state(), ViewState::Ready);

        let ticket = vm.set_location("Atlantis", today());
        assert!(vm.drive(&gateway, ticket).await);
        assert_eq!(vm.state(), ViewState::Failed);
        assert!(vm.is_stale());

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "Manhattan");
        assert_eq!(calls[1].0, "Atlantis");
        assert_eq!(calls[1].1.primary, date(2024, 3, 8));
    }
}
