use reqwest::StatusCode;
use thiserror::Error;

/// Which of the two network calls of a search produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Geocoding,
    Weather,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Geocoding => "geocoding",
            Stage::Weather => "weather",
        }
    }

    /// Text shown to the user when the service answers with a failure status.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Stage::Geocoding => "Geocoding failed",
            Stage::Weather => "Weather data fetch failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can end a search attempt.
///
/// The `Display` text is what a view shows verbatim, so it stays short and
/// free of HTTP detail; the status and sources are kept as data instead.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The geocoding service returned zero matches.
    #[error("City not found")]
    NotFound,

    /// One of the services answered with a non-success status.
    #[error("{}", .stage.failure_message())]
    Service { stage: Stage, status: StatusCode },

    /// The request could not be sent or its body could not be read.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a body we could not understand.
    #[error("Malformed {stage} response: {source}")]
    Parse {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound)
    }

    pub fn is_service(&self) -> bool {
        matches!(self, LookupError::Service { .. })
    }
}
