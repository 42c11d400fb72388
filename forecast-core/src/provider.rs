use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, DateWindow, ForecastBundle, error::GatewayError,
    provider::visualcrossing::VisualCrossingProvider,
};

pub mod visualcrossing;

/// Source of forecast bundles for a location and date window.
#[async_trait]
pub trait ForecastGateway: Send + Sync + Debug {
    async fn fetch(
        &self,
        location: &str,
        window: &DateWindow,
    ) -> Result<ForecastBundle, GatewayError>;
}

/// Construct the gateway described by config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastGateway>> {
    let api_key = config.api_key()?;

    let provider = VisualCrossingProvider::new(
        api_key.to_owned(),
        config.unit_system,
        config.base_url.clone(),
    )?;

    Ok(Box::new(provider))
}
