//! Advice request errors. None of these reach the conversation as a fault;
//! the dispatcher turns every one into the fallback reply.

use agri_core::{AppError, ConfigError, NetworkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("Completion request failed: {0}")]
    Network(#[from] NetworkError),

    #[error("OpenRouter API key is not configured")]
    MissingApiKey,

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Completion client error: {0}")]
    Client(String),
}

impl From<AdviceError> for AppError {
    fn from(err: AdviceError) -> Self {
        match err {
            AdviceError::Network(e) => AppError::Network(e),
            AdviceError::MissingApiKey => {
                AppError::Config(ConfigError::MissingSetting("openrouter.api_key".to_string()))
            }
            AdviceError::MalformedResponse(msg) => {
                AppError::Network(NetworkError::InvalidResponse(msg))
            }
            AdviceError::Client(msg) => AppError::Service(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_maps_to_config_error() {
        let app: AppError = AdviceError::MissingApiKey.into();
        assert!(matches!(app, AppError::Config(ConfigError::MissingSetting(_))));
    }

    #[test]
    fn test_malformed_maps_to_invalid_response() {
        let app: AppError = AdviceError::MalformedResponse("no choices".into()).into();
        assert_eq!(
            app.user_message(),
            "Received an unexpected response. Please try again."
        );
    }
}
