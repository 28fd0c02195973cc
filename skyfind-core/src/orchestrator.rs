//! The search sequence: geocode, fetch conditions, present.
//!
//! A search moves the orchestrator through `Idle -> Loading -> {Success, Error}`.
//! The view is told about every transition through [`SearchView`], and the
//! loading indicator is hidden on every exit path, including when the search
//! future is dropped half way.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    config::Config,
    error::LookupError,
    model::RenderPayload,
    presenter::Presenter,
    provider::{Geocoder, OpenMeteoClient, WeatherFetcher},
};

/// Display surface driven by the orchestrator.
///
/// Methods take `&self`; implementations own whatever interior state they need.
/// Callbacks run without the orchestrator's state lock held, so a view may
/// read [`SearchOrchestrator::state`] from inside them.
pub trait SearchView: Send + Sync {
    /// Hide any previous error or result.
    fn clear(&self);
    fn show_loading(&self);
    fn hide_loading(&self);
    fn show_error(&self, message: &str);
    fn show_result(&self, payload: &RenderPayload);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchState {
    Idle,
    Loading,
    Success,
    Error,
}

/// What a call to [`SearchOrchestrator::search`] did.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Input was empty after trimming; nothing happened.
    Skipped,
    /// Another search was still loading; this one was rejected.
    Busy,
    Found(RenderPayload),
    Failed(LookupError),
}

impl SearchOutcome {
    pub fn payload(&self) -> Option<&RenderPayload> {
        match self {
            SearchOutcome::Found(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LookupError> {
        match self {
            SearchOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct SearchOrchestrator<V> {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherFetcher>,
    presenter: Presenter,
    view: V,
    state: Mutex<SearchState>,
}

impl<V: SearchView> SearchOrchestrator<V> {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherFetcher>,
        presenter: Presenter,
        view: V,
    ) -> Self {
        Self {
            geocoder,
            weather,
            presenter,
            view,
            state: Mutex::new(SearchState::Idle),
        }
    }

    /// Orchestrator backed by Open-Meteo for both lookups.
    pub fn from_config(config: &Config, view: V) -> Result<Self, LookupError> {
        let client = Arc::new(OpenMeteoClient::new(config)?);
        Ok(Self::new(
            client.clone(),
            client,
            Presenter::new(config.icon_base_url.clone()),
            view,
        ))
    }

    pub fn state(&self) -> SearchState {
        *self.state.lock()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Run one search for `input`.
    ///
    /// Empty input is a no-op. A search started while another is loading is
    /// rejected with [`SearchOutcome::Busy`] without touching the view.
    #[instrument(skip(self))]
    pub async fn search(&self, input: &str) -> SearchOutcome {
        let city = input.trim();
        if city.is_empty() {
            return SearchOutcome::Skipped;
        }

        let Some(mut loading) = LoadingGuard::acquire(self) else {
            debug!("Search already in flight, rejecting");
            return SearchOutcome::Busy;
        };

        match self.lookup(city).await {
            Ok(payload) => {
                info!(
                    city = %payload.city_label(),
                    code = payload.conditions.weather_code,
                    "Search succeeded"
                );
                self.view.show_result(&payload);
                loading.finish(SearchState::Success);
                SearchOutcome::Found(payload)
            }
            Err(err) => {
                info!(error = %err, "Search failed");
                self.view.show_error(&err.to_string());
                loading.finish(SearchState::Error);
                SearchOutcome::Failed(err)
            }
        }
    }

    async fn lookup(&self, city: &str) -> Result<RenderPayload, LookupError> {
        let location = self.geocoder.resolve(city).await?;
        let conditions = self
            .weather
            .fetch_current(location.latitude, location.longitude)
            .await?;

        Ok(self.presenter.render(location, conditions))
    }
}

/// Holds the `Loading` state for the duration of one search.
///
/// Dropping it hides the loading indicator and moves to the finished state,
/// or back to `Idle` if the search never finished.
struct LoadingGuard<'a, V: SearchView> {
    orchestrator: &'a SearchOrchestrator<V>,
    finished: SearchState,
}

impl<'a, V: SearchView> LoadingGuard<'a, V> {
    fn acquire(orchestrator: &'a SearchOrchestrator<V>) -> Option<Self> {
        {
            let mut state = orchestrator.state.lock();
            if *state == SearchState::Loading {
                return None;
            }
            *state = SearchState::Loading;
        }
        orchestrator.view.clear();
        orchestrator.view.show_loading();

        Some(Self {
            orchestrator,
            finished: SearchState::Idle,
        })
    }

    fn finish(&mut self, state: SearchState) {
        self.finished = state;
    }
}

impl<V: SearchView> Drop for LoadingGuard<'_, V> {
    fn drop(&mut self) {
        // Still `Loading` here, so no other search can show its indicator
        // before this one is hidden.
        self.orchestrator.view.hide_loading();
        *self.orchestrator.state.lock() = self.finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::model::{CurrentConditions, Location};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Clear,
        ShowLoading,
        HideLoading,
        Error(String),
        Result(String),
    }

    #[derive(Debug, Default)]
    struct RecordingView {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingView {
        fn events(&self) -> Vec<Event> {
            self.events.lock().clone()
        }
    }

    impl SearchView for RecordingView {
        fn clear(&self) {
            self.events.lock().push(Event::Clear);
        }
        fn show_loading(&self) {
            self.events.lock().push(Event::ShowLoading);
        }
        fn hide_loading(&self) {
            self.events.lock().push(Event::HideLoading);
        }
        fn show_error(&self, message: &str) {
            self.events.lock().push(Event::Error(message.to_string()));
        }
        fn show_result(&self, payload: &RenderPayload) {
            self.events.lock().push(Event::Result(payload.city_label()));
        }
    }

    #[derive(Debug)]
    struct FakeGeocoder {
        location: Option<Location>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl FakeGeocoder {
        fn found(location: Location) -> Self {
            Self {
                location: Some(location),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                location: None,
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(location: Location, gate: Arc<Notify>) -> Self {
            Self {
                location: Some(location),
                gate: Some(gate),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn resolve(&self, _city_name: &str) -> Result<Location, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.location.clone().ok_or(LookupError::NotFound)
        }
    }

    #[derive(Debug)]
    struct FakeWeather {
        conditions: Option<CurrentConditions>,
        calls: AtomicUsize,
    }

    impl FakeWeather {
        fn returning(conditions: CurrentConditions) -> Self {
            Self {
                conditions: Some(conditions),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                conditions: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherFetcher for FakeWeather {
        async fn fetch_current(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<CurrentConditions, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.conditions.clone().ok_or(LookupError::Service {
                stage: Stage::Weather,
                status: StatusCode::SERVICE_UNAVAILABLE,
            })
        }
    }

    fn paris() -> Location {
        Location {
            display_name: "Paris".into(),
            country: "France".into(),
            latitude: 48.85,
            longitude: 2.35,
        }
    }

    fn mild() -> CurrentConditions {
        CurrentConditions {
            temperature_c: 15.4,
            humidity_pct: 60,
            wind_speed_kmh: 10.0,
            weather_code: 2,
            observed_at: None,
        }
    }

    fn orchestrator(
        geocoder: Arc<FakeGeocoder>,
        weather: Arc<FakeWeather>,
    ) -> SearchOrchestrator<RecordingView> {
        SearchOrchestrator::new(geocoder, weather, Presenter::default(), RecordingView::default())
    }

    #[tokio::test]
    async fn successful_search_renders_payload() {
        let orch = orchestrator(
            Arc::new(FakeGeocoder::found(paris())),
            Arc::new(FakeWeather::returning(mild())),
        );

        let outcome = orch.search("  Paris ").await;
        let payload = outcome.payload().expect("payload");
        let labels = payload.labels();

        assert_eq!(labels.city, "Paris, France");
        assert_eq!(labels.temperature, "15°C");
        assert_eq!(labels.description, "Partly cloudy");
        assert_eq!(labels.humidity, "60%");
        assert_eq!(labels.wind, "10 km/h");
        assert_eq!(orch.state(), SearchState::Success);
        assert_eq!(
            orch.view().events(),
            vec![
                Event::Clear,
                Event::ShowLoading,
                Event::Result("Paris, France".into()),
                Event::HideLoading,
            ]
        );
    }

    #[tokio::test]
    async fn not_found_shows_error_and_skips_weather() {
        let weather = Arc::new(FakeWeather::returning(mild()));
        let orch = orchestrator(Arc::new(FakeGeocoder::empty()), weather.clone());

        let outcome = orch.search("Xyzzzzy").await;

        assert!(outcome.payload().is_none());
        assert!(outcome.error().is_some_and(LookupError::is_not_found));
        assert_eq!(weather.calls(), 0);
        assert_eq!(orch.state(), SearchState::Error);
        assert_eq!(
            orch.view().events(),
            vec![
                Event::Clear,
                Event::ShowLoading,
                Event::Error("City not found".into()),
                Event::HideLoading,
            ]
        );
    }

    #[tokio::test]
    async fn weather_failure_clears_loading() {
        let orch = orchestrator(
            Arc::new(FakeGeocoder::found(paris())),
            Arc::new(FakeWeather::failing()),
        );

        let outcome = orch.search("Paris").await;

        assert!(outcome.error().is_some_and(LookupError::is_service));
        let events = orch.view().events();
        assert_eq!(events.last(), Some(&Event::HideLoading));
        assert!(events.contains(&Event::Error("Weather data fetch failed".into())));
        assert!(!events.iter().any(|e| matches!(e, Event::Result(_))));
    }

    #[tokio::test]
    async fn blank_input_does_nothing() {
        let geocoder = Arc::new(FakeGeocoder::found(paris()));
        let weather = Arc::new(FakeWeather::returning(mild()));
        let orch = orchestrator(geocoder.clone(), weather.clone());

        for input in ["", "   ", "\t\n"] {
            assert!(matches!(orch.search(input).await, SearchOutcome::Skipped));
        }

        assert_eq!(geocoder.calls(), 0);
        assert_eq!(weather.calls(), 0);
        assert_eq!(orch.state(), SearchState::Idle);
        assert!(orch.view().events().is_empty());
    }

    #[tokio::test]
    async fn blank_input_keeps_previous_result() {
        let orch = orchestrator(
            Arc::new(FakeGeocoder::found(paris())),
            Arc::new(FakeWeather::returning(mild())),
        );

        orch.search("Paris").await;
        let before = orch.view().events();
        orch.search(" ").await;

        assert_eq!(orch.view().events(), before);
        assert_eq!(orch.state(), SearchState::Success);
    }

    #[tokio::test]
    async fn new_search_after_error_restarts_cycle() {
        let orch = orchestrator(
            Arc::new(FakeGeocoder::found(paris())),
            Arc::new(FakeWeather::failing()),
        );

        orch.search("Paris").await;
        orch.search("Paris").await;

        let clears = orch
            .view()
            .events()
            .iter()
            .filter(|e| **e == Event::Clear)
            .count();
        assert_eq!(clears, 2);
        assert_eq!(orch.state(), SearchState::Error);
    }

    #[tokio::test]
    async fn overlapping_search_is_rejected() {
        let gate = Arc::new(Notify::new());
        let geocoder = Arc::new(FakeGeocoder::gated(paris(), gate.clone()));
        let orch = Arc::new(orchestrator(
            geocoder.clone(),
            Arc::new(FakeWeather::returning(mild())),
        ));

        let first = tokio::spawn({
            let orch = orch.clone();
            async move { orch.search("Paris").await }
        });

        while orch.state() != SearchState::Loading {
            tokio::task::yield_now().await;
        }

        let second = orch.search("Berlin").await;
        assert!(matches!(second, SearchOutcome::Busy));

        gate.notify_one();
        let first = first.await.expect("first search task");

        assert!(first.payload().is_some());
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(orch.state(), SearchState::Success);
    }

    #[tokio::test]
    async fn cancelled_search_hides_loading() {
        let gate = Arc::new(Notify::new());
        let orch = orchestrator(
            Arc::new(FakeGeocoder::gated(paris(), gate)),
            Arc::new(FakeWeather::returning(mild())),
        );

        let res = tokio::time::timeout(Duration::from_millis(20), orch.search("Paris")).await;

        assert!(res.is_err());
        assert_eq!(orch.state(), SearchState::Idle);
        assert_eq!(orch.view().events().last(), Some(&Event::HideLoading));
    }

    /// Records the orchestrator state seen from inside each callback.
    #[derive(Default)]
    struct StateReadingView {
        orchestrator: OnceLock<Weak<SearchOrchestrator<StateReadingView>>>,
        seen: Mutex<Vec<SearchState>>,
    }

    impl StateReadingView {
        fn record(&self) {
            if let Some(orch) = self.orchestrator.get().and_then(Weak::upgrade) {
                self.seen.lock().push(orch.state());
            }
        }
    }

    impl SearchView for StateReadingView {
        fn clear(&self) {
            self.record();
        }
        fn show_loading(&self) {
            self.record();
        }
        fn hide_loading(&self) {
            self.record();
        }
        fn show_error(&self, _message: &str) {
            self.record();
        }
        fn show_result(&self, _payload: &RenderPayload) {
            self.record();
        }
    }

    #[tokio::test]
    async fn view_can_read_state_from_callbacks() {
        let orch = Arc::new(SearchOrchestrator::new(
            Arc::new(FakeGeocoder::found(paris())),
            Arc::new(FakeWeather::returning(mild())),
            Presenter::default(),
            StateReadingView::default(),
        ));
        assert!(orch.view().orchestrator.set(Arc::downgrade(&orch)).is_ok());

        let outcome = orch.search("Paris").await;

        assert!(outcome.payload().is_some());
        assert_eq!(*orch.view().seen.lock(), vec![SearchState::Loading; 4]);
        assert_eq!(orch.state(), SearchState::Success);
    }
}
