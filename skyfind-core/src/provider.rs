use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::LookupError,
    model::{CurrentConditions, Location},
};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Resolves a free-text city name to its best match.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// `city_name` is expected to be trimmed and non-empty.
    async fn resolve(&self, city_name: &str) -> Result<Location, LookupError>;
}

/// Fetches current conditions at a coordinate.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, LookupError>;
}
