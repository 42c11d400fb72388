use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::GatewayError,
    model::{
        CurrentConditions, DailySummary, DateWindow, DayForecast, ForecastBundle, HourlySeries,
        UnitSystem,
    },
};

use super::ForecastGateway;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const INCLUDE: &str = "hours,days,current";
const HOURS_PER_DAY: usize = 24;

/// The window runs primary..=secondary, so the secondary day is the eighth entry.
const PRIMARY_DAY: usize = 0;
const SECONDARY_DAY: usize = 7;

/// Visual Crossing timeline API.
#[derive(Debug, Clone)]
pub struct VisualCrossingProvider {
    api_key: String,
    unit_system: UnitSystem,
    base_url: Url,
    http: Client,
}

impl VisualCrossingProvider {
    pub fn new(api_key: String, unit_system: UnitSystem, base_url: String) -> anyhow::Result<Self> {
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("Invalid provider base URL: {base_url}"))?;

        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Provider base URL cannot take path segments: {base_url}"));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            unit_system,
            base_url,
            http,
        })
    }

    /// `{base}/timeline/{location}/{primary}/{secondary}?unitGroup=..&include=..&key=..&contentType=json`
    pub fn timeline_url(&self, location: &str, window: &DateWindow) -> Url {
        let mut url = self.base_url.clone();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("timeline")
                .push(location)
                .push(&window.primary_str())
                .push(&window.secondary_str());
        }

        url.query_pairs_mut()
            .append_pair("unitGroup", self.unit_system.as_str())
            .append_pair("include", INCLUDE)
            .append_pair("key", &self.api_key)
            .append_pair("contentType", "json");

        url
    }
}

#[async_trait]
impl ForecastGateway for VisualCrossingProvider {
    #[instrument(
        skip(self, window),
        fields(primary = %window.primary, secondary = %window.secondary)
    )]
    async fn fetch(
        &self,
        location: &str,
        window: &DateWindow,
    ) -> Result<ForecastBundle, GatewayError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(GatewayError::InvalidLocation("location is empty".to_string()));
        }

        let url = self.timeline_url(location, window);
        debug!(path = url.path(), units = %self.unit_system, "requesting timeline");

        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        debug!(%status, bytes = body.len(), "timeline response received");

        // Visual Crossing answers an unresolvable location with 400.
        if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
            return Err(GatewayError::InvalidLocation(format!(
                "{location}: {}",
                truncate_body(&body)
            )));
        }

        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: VcTimelineResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON: {e}")))?;

        parsed.into_bundle(location, self.unit_system)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VcTimelineResponse {
    resolved_address: Option<String>,
    #[serde(default)]
    days: Vec<VcDay>,
    current_conditions: Option<VcCurrent>,
}

#[derive(Debug, Deserialize)]
struct VcDay {
    datetime: String,
    temp: Option<f64>,
    windspeed: Option<f64>,
    conditions: Option<String>,
    precipprob: Option<f64>,
    #[serde(default)]
    hours: Vec<VcHour>,
}

#[derive(Debug, Deserialize)]
struct VcHour {
    temp: Option<f64>,
    precipprob: Option<f64>,
    windspeed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VcCurrent {
    datetime: Option<String>,
    temp: Option<f64>,
    windspeed: Option<f64>,
    conditions: Option<String>,
    precipprob: Option<f64>,
}

impl VcTimelineResponse {
    fn into_bundle(
        self,
        location: &str,
        unit_system: UnitSystem,
    ) -> Result<ForecastBundle, GatewayError> {
        if self.days.len() <= SECONDARY_DAY {
            return Err(GatewayError::MalformedResponse(format!(
                "expected at least {} days, got {}",
                SECONDARY_DAY + 1,
                self.days.len()
            )));
        }

        let primary = day_forecast(&self.days, PRIMARY_DAY)?;
        let secondary = day_forecast(&self.days, SECONDARY_DAY)?;

        let current = self.current_conditions.map(|c| CurrentConditions {
            observed_at: c.datetime,
            temperature: whole(c.temp),
            wind: whole(c.windspeed),
            conditions: c.conditions.unwrap_or_default(),
            rain_chance: c.precipprob.unwrap_or_default(),
        });

        Ok(ForecastBundle {
            resolved_address: self
                .resolved_address
                .unwrap_or_else(|| location.to_string()),
            unit_system,
            primary,
            secondary,
            current,
        })
    }
}

fn day_forecast(days: &[VcDay], index: usize) -> Result<DayForecast, GatewayError> {
    let day = days.get(index).ok_or_else(|| {
        GatewayError::MalformedResponse(format!("days[{index}] missing from response"))
    })?;

    if day.hours.len() != HOURS_PER_DAY {
        return Err(GatewayError::MalformedResponse(format!(
            "days[{index}] has {} hourly entries, expected {HOURS_PER_DAY}",
            day.hours.len()
        )));
    }

    let date = NaiveDate::parse_from_str(&day.datetime, "%Y-%m-%d").map_err(|e| {
        GatewayError::MalformedResponse(format!(
            "days[{index}].datetime '{}' is not a date: {e}",
            day.datetime
        ))
    })?;

    let summary = DailySummary {
        date,
        temperature: whole(day.temp),
        wind: whole(day.windspeed),
        conditions: day.conditions.clone().unwrap_or_default(),
        rain_chance: day.precipprob.unwrap_or_default(),
    };

    let hourly = HourlySeries {
        temperature: day.hours.iter().map(|h| whole(h.temp)).collect(),
        precip_prob: day
            .hours
            .iter()
            .map(|h| h.precipprob.unwrap_or_default())
            .collect(),
        wind_speed: day.hours.iter().map(|h| whole(h.windspeed)).collect(),
    };

    Ok(DayForecast { summary, hourly })
}

/// Round to a whole display unit; a null reading counts as zero.
fn whole(value: Option<f64>) -> f64 {
    value.unwrap_or_default().round()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
