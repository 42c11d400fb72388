//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Date windowing for a chosen weekday and week offset
//! - Hour-of-day buckets and series projection
//! - The forecast gateway (Visual Crossing timeline API)
//! - A view model tying selection, fetches and the latest forecast together
//! - Chart slots that own drawn charts
//!
//! It is used by `forecast-cli`, but can also be reused by other front ends.

pub mod chart;
pub mod config;
pub mod dates;
pub mod error;
pub mod hours;
pub mod model;
pub mod provider;
pub mod view_model;

pub use chart::{Chart, ChartData, ChartSlot};
pub use config::Config;
pub use error::GatewayError;
pub use hours::ProjectedSeries;
pub use model::{
    ConditionKind, CurrentConditions, DailySummary, DateWindow, DayForecast, ForecastBundle,
    HourlySeries, Selection, TimeOfDay, UnitSystem,
};
pub use provider::{ForecastGateway, provider_from_config};
pub use view_model::{FetchTicket, ForecastViewModel, ViewState};
