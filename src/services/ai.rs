use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;

use crate::{
    config::Config,
    models::film::{FilmResponse, FilmSummaryResponse},
    services::films::FilmService,
};

const ASK_SYSTEM_PROMPT: &str = "You are a helpful assistant for a DVD rental store. \
Answer questions about films, actors and rentals clearly and concisely.";

const SUMMARY_SYSTEM_PROMPT: &str = "You summarize films for a DVD rental store. \
Reply with a single JSON object with exactly these keys: \
\"title\" (string, the film title), \
\"rating\" (string, the MPAA rating), \
\"recommended\" (boolean, true if the rating is higher than PG-13 and the rental rate is less than 3.00), \
\"summary\" (string, a short summary based on the details provided).";

pub const EMPTY_ASK_RESPONSE: &str = "No response from AI";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI service is not configured")]
    NotConfigured,
    #[error("Film with ID {0} not found")]
    FilmNotFound(i32),
    #[error("chat completion request failed: {0}")]
    Upstream(String),
    #[error("AI service returned empty response")]
    EmptyResponse,
    #[error("AI response format is invalid: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Upstream(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatCompletion {
    /// Text of the first choice, if it has any.
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
    }
}

struct ChatEndpoint {
    url: String,
    api_key: String,
}

/// Thin client over an Azure OpenAI chat-completions deployment.
pub struct AiService {
    client: Client,
    endpoint: Option<ChatEndpoint>,
}

impl AiService {
    pub fn new(config: &Config) -> Self {
        let endpoint = match (
            &config.azure_openai_api_key,
            &config.azure_openai_endpoint,
            &config.azure_openai_deployment_name,
        ) {
            (Some(api_key), Some(endpoint), Some(deployment)) => Some(ChatEndpoint {
                url: chat_url(endpoint, deployment, &config.azure_openai_api_version),
                api_key: api_key.clone(),
            }),
            _ => None,
        };

        Self {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        json_output: bool,
    ) -> Result<Option<String>, AiError> {
        let endpoint = self.endpoint.as_ref().ok_or(AiError::NotConfigured)?;

        let mut payload = json!({
            "messages": [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
        });
        if json_output {
            payload["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(&endpoint.url)
            .header("api-key", &endpoint.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Chat completion error {}: {}", status, text);
            return Err(AiError::Upstream(format!("status {status}")));
        }

        let completion: ChatCompletion = response.json().await?;
        Ok(completion.into_text())
    }

    pub async fn ask(&self, question: &str) -> Result<String, AiError> {
        let start = Instant::now();
        tracing::debug!(prompt_length = question.len(), "Processing AI ask request");

        match self.complete(ASK_SYSTEM_PROMPT, question, false).await {
            Ok(Some(answer)) => {
                tracing::info!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    response_length = answer.len(),
                    "AI ask completed"
                );
                Ok(answer)
            }
            Ok(None) => {
                tracing::warn!("AI ask returned empty response");
                Ok(EMPTY_ASK_RESPONSE.to_string())
            }
            Err(e) => {
                tracing::error!(error = %e, duration_ms = start.elapsed().as_millis() as u64, "AI ask failed");
                Err(e)
            }
        }
    }

    pub async fn film_summary(
        &self,
        pool: &PgPool,
        film_id: i32,
    ) -> Result<FilmSummaryResponse, AiError> {
        let start = Instant::now();
        tracing::debug!(film_id, "Processing film summary request");

        if !self.is_configured() {
            return Err(AiError::NotConfigured);
        }

        let film: FilmResponse = FilmService::get(pool, film_id)
            .await?
            .ok_or(AiError::FilmNotFound(film_id))?
            .into();
        let details = serde_json::to_string(&film).map_err(|e| AiError::Database(e.into()))?;

        let content = self
            .complete(SUMMARY_SYSTEM_PROMPT, &format!("Film details: {details}"), true)
            .await?
            .ok_or_else(|| {
                tracing::error!(film_id, "AI film summary returned empty response");
                AiError::EmptyResponse
            })?;

        let summary = parse_summary(&content)?;
        tracing::info!(
            film_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Film summary completed"
        );
        Ok(summary)
    }
}

fn chat_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        api_version
    )
}

fn parse_summary(content: &str) -> Result<FilmSummaryResponse, AiError> {
    serde_json::from_str(content.trim()).map_err(|e| {
        let preview: String = content.chars().take(200).collect();
        tracing::error!(error = %e, content_preview = %preview, "Failed to parse AI response");
        AiError::InvalidResponse(e.to_string())
    })
}
