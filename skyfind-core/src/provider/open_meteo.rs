use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    config::Config,
    error::{LookupError, Stage},
    model::{CurrentConditions, Location},
};

use super::{Geocoder, WeatherFetcher};

/// Fields requested from the forecast endpoint, in request order.
pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";

/// Client for the Open-Meteo geocoding and forecast APIs. No API key needed.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
    language: String,
}

impl OpenMeteoClient {
    pub fn new(config: &Config) -> Result<Self, LookupError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn resolve(&self, city_name: &str) -> Result<Location, LookupError> {
        let res = self
            .http
            .get(&self.geocoding_url)
            .query(&[
                ("name", city_name),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        let parsed: GeoResponse = read_json(res, Stage::Geocoding).await?;

        let first = parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(LookupError::NotFound)?;

        debug!(
            name = %first.name,
            country = first.country.as_deref().unwrap_or(""),
            lat = first.latitude,
            lon = first.longitude,
            "Resolved city"
        );

        Ok(Location {
            display_name: first.name,
            country: first.country.unwrap_or_default(),
            latitude: first.latitude,
            longitude: first.longitude,
        })
    }
}

#[async_trait]
impl WeatherFetcher for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, LookupError> {
        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ])
            .send()
            .await?;

        let parsed: ForecastResponse = read_json(res, Stage::Weather).await?;
        let current = parsed.current;

        Ok(CurrentConditions {
            temperature_c: current.temperature_2m,
            humidity_pct: current.relative_humidity_2m,
            wind_speed_kmh: current.wind_speed_10m,
            weather_code: current.weather_code,
            observed_at: current.time.as_deref().and_then(parse_observation_time),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    // Open-Meteo omits the key entirely when nothing matches.
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: ForecastCurrent,
}

#[derive(Debug, Deserialize)]
struct ForecastCurrent {
    #[serde(default)]
    time: Option<String>,
    temperature_2m: f64,
    relative_humidity_2m: u8,
    weather_code: i32,
    wind_speed_10m: f64,
}

/// Check the status, then decode the body as JSON.
async fn read_json<T: DeserializeOwned>(res: Response, stage: Stage) -> Result<T, LookupError> {
    let status = res.status();

    if !status.is_success() {
        // The status alone decides; the body is only read for the log.
        let body = res.text().await.unwrap_or_default();
        warn!(%stage, %status, body = %truncate_body(&body), "Service returned failure status");
        return Err(LookupError::Service { stage, status });
    }

    let body = res.text().await?;

    serde_json::from_str(&body).map_err(|source| {
        debug!(%stage, body = %truncate_body(&body), "Unparseable response body");
        LookupError::Parse { stage, source }
    })
}

/// Open-Meteo reports `current.time` as local ISO 8601 without seconds.
fn parse_observation_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| debug!(raw, error = %e, "Ignoring unparseable observation time"))
        .ok()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
