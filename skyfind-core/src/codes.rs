//! WMO weather interpretation codes.
//!
//! Both lookups are plain data: an exact-match table for descriptions and an
//! ordered list of range rules for icons.
//! See: <https://open-meteo.com/en/docs#weathervariables>

use serde::{Deserialize, Serialize};

/// Returned by [`describe`] for codes missing from [`DESCRIPTIONS`].
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

pub const DESCRIPTIONS: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (71, "Slight snow"),
    (73, "Moderate snow"),
    (75, "Heavy snow"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

/// Icon shown next to the conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Clear,
    Cloud,
    Fog,
    Rain,
    Snow,
    Showers,
    Thunderstorm,
}

impl Icon {
    pub const fn all() -> &'static [Icon] {
        &[
            Icon::Clear,
            Icon::Cloud,
            Icon::Fog,
            Icon::Rain,
            Icon::Snow,
            Icon::Showers,
            Icon::Thunderstorm,
        ]
    }

    /// Asset name on the icon CDN. Rain and showers share an image.
    pub fn asset(&self) -> &'static str {
        match self {
            Icon::Clear => "01d",
            Icon::Cloud => "03d",
            Icon::Fog => "50d",
            Icon::Rain | Icon::Showers => "09d",
            Icon::Snow => "13d",
            Icon::Thunderstorm => "11d",
        }
    }

    /// Full icon reference below `base_url`, e.g. `<base>/01d@4x.png`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}@4x.png", base_url.trim_end_matches('/'), self.asset())
    }
}

/// Inclusive code range mapped to an icon.
#[derive(Debug, Clone, Copy)]
pub struct IconRule {
    pub min: i32,
    pub max: i32,
    pub icon: Icon,
}

impl IconRule {
    const fn new(min: i32, max: i32, icon: Icon) -> Self {
        Self { min, max, icon }
    }

    pub fn matches(&self, code: i32) -> bool {
        (self.min..=self.max).contains(&code)
    }
}

/// Checked in order; the first matching rule wins.
pub const ICON_RULES: &[IconRule] = &[
    IconRule::new(0, 0, Icon::Clear),
    IconRule::new(1, 3, Icon::Cloud),
    IconRule::new(45, 48, Icon::Fog),
    IconRule::new(51, 67, Icon::Rain),
    IconRule::new(71, 77, Icon::Snow),
    IconRule::new(80, 82, Icon::Showers),
    IconRule::new(95, i32::MAX, Icon::Thunderstorm),
];

/// Icon for codes no rule covers (negatives and the gaps between ranges).
pub const FALLBACK_ICON: Icon = Icon::Clear;

/// Human-readable text for a WMO code, or `"Unknown"`.
pub fn describe(code: i32) -> &'static str {
    DESCRIPTIONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, text)| *text)
        .unwrap_or(UNKNOWN_DESCRIPTION)
}

pub fn icon_for(code: i32) -> Icon {
    ICON_RULES
        .iter()
        .find(|rule| rule.matches(code))
        .map(|rule| rule.icon)
        .unwrap_or(FALLBACK_ICON)
}
