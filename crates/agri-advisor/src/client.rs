//! OpenRouter chat completion client.

use agri_core::{Config, NetworkError, ReqwestErrorExt};
use reqwest::Client;
use tracing::instrument;

use crate::error::AdviceError;
use crate::types::{CompletionRequest, CompletionResponse, WireMessage};

/// Does not derive Debug; the API key must never reach a log line.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    site_url: String,
    site_name: String,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl CompletionClient {
    pub fn new(config: &Config) -> Result<Self, AdviceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AdviceError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.openrouter.base_url.trim_end_matches('/').to_string(),
            model: config.openrouter.model.clone(),
            api_key: config.openrouter.api_key.clone(),
            site_url: config.site.url.clone(),
            site_name: config.site.name.clone(),
        })
    }

    /// Send one completion request and return the top reply text.
    #[instrument(skip(self, messages), fields(model = %self.model), level = "info")]
    pub async fn complete(&self, messages: Vec<WireMessage>) -> Result<String, AdviceError> {
        let api_key = self.api_key.as_deref().ok_or(AdviceError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        let body = CompletionRequest {
            model: self.model.clone(),
            messages,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.site_name)
            .json(&body)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AdviceError::MalformedResponse(e.to_string()))?;

        parsed.into_reply()
    }
}
