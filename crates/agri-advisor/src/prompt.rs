//! Prompt composition: system instruction carrying location and climate context.

use agri_context::{describe_location, ClimateContext, Coordinates, LocationInfo, UNKNOWN_LOCATION};

use crate::types::{WireMessage, WireRole};

pub const SYSTEM_INSTRUCTION: &str =
    "You are an agricultural assistant who only talks about agriculture and crops. Answer concisely.";

/// Snapshot of everything the dispatcher knows when a message is sent.
///
/// The location may lag the coordinates if a geocoding call is still in flight.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub coordinates: Option<Coordinates>,
    pub location: Option<LocationInfo>,
    pub climate: ClimateContext,
}

impl PromptContext {
    /// Place description used in the prompt
    pub fn location_string(&self) -> String {
        match self.coordinates {
            Some(_) => describe_location(self.location.as_ref()),
            None => UNKNOWN_LOCATION.to_string(),
        }
    }

    pub fn system_prompt(&self) -> String {
        let position = match self.coordinates {
            Some(c) => format!(
                "The user's location is at coordinates {}°N, {}°E, which is in {}.",
                c.latitude,
                c.longitude,
                self.location_string()
            ),
            None => format!("The user's location is {}.", UNKNOWN_LOCATION),
        };

        format!(
            "{} {} Use this location information and the following NASA POWER API data to provide relevant agricultural advice: {}",
            SYSTEM_INSTRUCTION,
            position,
            self.climate.to_prompt_string()
        )
    }

    /// System turn plus the latest user turn. Earlier history is not resent.
    pub fn build_messages(&self, user_text: &str) -> Vec<WireMessage> {
        vec![
            WireMessage {
                role: WireRole::System,
                content: self.system_prompt(),
            },
            WireMessage {
                role: WireRole::User,
                content: user_text.to_string(),
            },
        ]
    }
}
