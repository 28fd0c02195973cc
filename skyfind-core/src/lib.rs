//! Core library for the `skyfind` weather lookup.
//!
//! This crate defines:
//! - Configuration handling
//! - Geocoding and current-conditions lookups (Open-Meteo)
//! - The WMO code table and the presenter building render payloads
//! - The search orchestrator driving a pluggable view
//!
//! It is used by `skyfind-cli`, but any surface implementing [`SearchView`]
//! can drive a search.

pub mod codes;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod presenter;
pub mod provider;

pub use codes::{Icon, describe, icon_for};
pub use config::Config;
pub use error::{LookupError, Stage};
pub use model::{CurrentConditions, Location, RenderLabels, RenderPayload};
pub use orchestrator::{SearchOrchestrator, SearchOutcome, SearchState, SearchView};
pub use presenter::Presenter;
pub use provider::{Geocoder, OpenMeteoClient, WeatherFetcher};
