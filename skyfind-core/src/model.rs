use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::codes::Icon;

/// Best geocoding match for a city name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub display_name: String,
    /// Empty when the service does not report a country for the match.
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions as reported by the forecast service, unconverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_kmh: f64,
    pub weather_code: i32,
    /// Local time of the observation at the location, when reported.
    pub observed_at: Option<NaiveDateTime>,
}

/// Everything a view needs to show a completed search.
///
/// Only built once both the location and the conditions are known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPayload {
    pub location: Location,
    pub conditions: CurrentConditions,
    pub description: String,
    pub icon: Icon,
    pub icon_ref: String,
}

impl RenderPayload {
    /// `"Paris, France"`, or just the name when the country is unknown.
    pub fn city_label(&self) -> String {
        if self.location.country.is_empty() {
            self.location.display_name.clone()
        } else {
            format!("{}, {}", self.location.display_name, self.location.country)
        }
    }

    pub fn temperature_label(&self) -> String {
        format!("{}°C", round_half_up(self.conditions.temperature_c))
    }

    pub fn humidity_label(&self) -> String {
        format!("{}%", self.conditions.humidity_pct)
    }

    pub fn wind_label(&self) -> String {
        format!("{} km/h", self.conditions.wind_speed_kmh)
    }

    pub fn labels(&self) -> RenderLabels {
        RenderLabels {
            city: self.city_label(),
            temperature: self.temperature_label(),
            description: self.description.clone(),
            humidity: self.humidity_label(),
            wind: self.wind_label(),
            icon: self.icon_ref.clone(),
        }
    }
}

/// Preformatted text for each field of the result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderLabels {
    pub city: String,
    pub temperature: String,
    pub description: String,
    pub humidity: String,
    pub wind: String,
    pub icon: String,
}

/// Rounds .5 towards positive infinity, so -2.5 becomes -2.
fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}
