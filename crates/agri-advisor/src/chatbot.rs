//! The chat widget core: session, location enrichment and dispatch wired together.

use agri_context::{
    ClimateContext, Coordinates, LocationEnricher, LocationInfo, RefreshOutcome,
    ReverseGeocoder,
};
use agri_core::{AppError, Config};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::client::CompletionClient;
use crate::dispatcher::{AdviceDispatcher, AdviceOutcome};
use crate::prompt::PromptContext;
use crate::session::ConversationSession;
use crate::types::ChatMessage;

/// Share behind an `Arc` to submit from several tasks. Locks are never held
/// across an `.await`, so a slow exchange does not block the others.
#[derive(Debug)]
pub struct AgriChatbot {
    session: Mutex<ConversationSession>,
    enricher: LocationEnricher,
    dispatcher: AdviceDispatcher,
    coordinates: RwLock<Option<Coordinates>>,
    climate: RwLock<ClimateContext>,
}

impl AgriChatbot {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let geocoder = ReverseGeocoder::new(&config.geocoding, &config.http)?;
        let client = CompletionClient::new(config)?;
        Ok(Self::from_parts(
            LocationEnricher::new(geocoder),
            AdviceDispatcher::new(client),
        ))
    }

    pub fn from_parts(enricher: LocationEnricher, dispatcher: AdviceDispatcher) -> Self {
        Self {
            session: Mutex::new(ConversationSession::new()),
            enricher,
            dispatcher,
            coordinates: RwLock::new(None),
            climate: RwLock::new(ClimateContext::default()),
        }
    }

    /// Record new coordinates and start resolving them in the background.
    ///
    /// Returns `None` when the coordinates did not change. Must be called
    /// inside a Tokio runtime.
    pub fn set_coordinates(&self, coords: Coordinates) -> Option<JoinHandle<RefreshOutcome>> {
        {
            let mut current = self.coordinates.write();
            if *current == Some(coords) {
                return None;
            }
            *current = Some(coords);
        }
        tracing::debug!("Coordinates changed to ({}, {})", coords.latitude, coords.longitude);
        Some(self.enricher.spawn_refresh(coords))
    }

    /// Resolve the current coordinates and wait for the result
    pub async fn refresh_location(&self) -> Option<RefreshOutcome> {
        let coords = (*self.coordinates.read())?;
        Some(self.enricher.refresh(coords).await)
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        *self.coordinates.read()
    }

    pub fn location(&self) -> Option<LocationInfo> {
        self.enricher.current()
    }

    pub fn set_climate(&self, climate: ClimateContext) {
        *self.climate.write() = climate;
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.session.lock().set_input(text);
    }

    pub fn input(&self) -> String {
        self.session.lock().input().to_string()
    }

    pub fn is_loading(&self) -> bool {
        self.session.lock().is_loading()
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.session.lock().messages().to_vec()
    }

    /// Submit `text` as if typed and sent. `None` for blank input.
    pub async fn submit(&self, text: impl Into<String>) -> Option<AdviceOutcome> {
        let user_text = {
            let mut session = self.session.lock();
            session.set_input(text);
            session.begin_exchange()?
        };
        Some(self.exchange(&user_text).await)
    }

    /// Submit whatever is in the pending input. `None` for blank input.
    pub async fn submit_input(&self) -> Option<AdviceOutcome> {
        let user_text = self.session.lock().begin_exchange()?;
        Some(self.exchange(&user_text).await)
    }

    async fn exchange(&self, user_text: &str) -> AdviceOutcome {
        let context = self.prompt_context();
        let outcome = self.dispatcher.dispatch(&context, user_text).await;
        self.session.lock().finish_exchange(&outcome);
        outcome
    }

    /// Whatever is known right now; an in-flight geocode is not awaited.
    fn prompt_context(&self) -> PromptContext {
        PromptContext {
            coordinates: self.coordinates(),
            location: self.enricher.current(),
            climate: self.climate.read().clone(),
        }
    }
}
