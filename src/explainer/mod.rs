use crate::event::AppEvent;
use crate::models::{LoanDecision, OfferRecommendation};
use crate::session::Message;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::mpsc;
use thiserror::Error;
use tokio::runtime::Handle;

pub mod prompt;

pub use prompt::EXPLAINER_SYSTEM_PROMPT;

const SAMPLING_TEMPERATURE: f32 = 0.7;
const EXPLANATION_MAX_TOKENS: u32 = 300;
const REPLY_MAX_TOKENS: u32 = 250;

const DEFAULT_API_VERSION: &str = "2024-12-01-preview";
const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

#[derive(Debug, Error)]
pub enum ExplainerError {
    #[error("missing environment variable {0}")]
    MissingConfig(&'static str),
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion endpoint returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("completion response contained no choices")]
    EmptyResponse,
    #[error("tokio runtime unavailable: {0}")]
    Runtime(String),
}

/// Routing and credentials for the hosted chat-completions deployment,
/// supplied out-of-band through the environment.
#[derive(Debug, Clone)]
pub struct ExplainerConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub deployment: String,
}

impl ExplainerConfig {
    pub fn from_env() -> Result<Self, ExplainerError> {
        Ok(Self {
            endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
            api_key: require_env("AZURE_OPENAI_API_KEY")?,
            api_version: env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            deployment: env::var("AZURE_OPENAI_DEPLOYMENT")
                .unwrap_or_else(|_| DEFAULT_DEPLOYMENT.to_string()),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

fn require_env(name: &'static str) -> Result<String, ExplainerError> {
    env::var(name).map_err(|_| ExplainerError::MissingConfig(name))
}

/// Client for the external text-generation service. Requests run on the
/// background runtime; results come back to the UI thread as [`AppEvent`]s.
#[derive(Clone)]
pub struct ExplainerClient {
    config: ExplainerConfig,
    http: Client,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl ExplainerClient {
    /// Must be called from within the tokio runtime so request tasks can be
    /// spawned later from the UI thread.
    pub fn new(config: ExplainerConfig, tx: mpsc::Sender<AppEvent>) -> Result<Self, ExplainerError> {
        let runtime_handle =
            Handle::try_current().map_err(|err| ExplainerError::Runtime(err.to_string()))?;

        Ok(Self {
            config,
            http: Client::new(),
            tx,
            runtime_handle,
        })
    }

    pub fn explain_loan(&self, decision: &LoanDecision) {
        self.spawn_completion(
            explanation_wire(prompt::loan_explanation(decision)),
            EXPLANATION_MAX_TOKENS,
            AppEvent::ExplanationReady,
        );
    }

    pub fn explain_offer(&self, recommendation: &OfferRecommendation) {
        self.spawn_completion(
            explanation_wire(prompt::offer_explanation(recommendation)),
            EXPLANATION_MAX_TOKENS,
            AppEvent::ExplanationReady,
        );
    }

    pub fn reply(&self, transcript: &[Message]) {
        self.spawn_completion(
            conversation_wire(transcript),
            REPLY_MAX_TOKENS,
            AppEvent::AssistantReply,
        );
    }

    fn spawn_completion(
        &self,
        messages: Vec<WireMessage>,
        max_tokens: u32,
        into_event: fn(String) -> AppEvent,
    ) {
        let http = self.http.clone();
        let url = self.config.completions_url();
        let api_key = self.config.api_key.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let request = CompletionRequest {
                messages,
                temperature: SAMPLING_TEMPERATURE,
                max_tokens,
            };

            match request_completion(&http, &url, &api_key, &request).await {
                Ok(text) => {
                    let _ = tx.send(into_event(text));
                }
                Err(err) => {
                    tracing::error!(error = %err, "completion request failed");
                    let _ = tx.send(AppEvent::RequestFailed(err.to_string()));
                }
            }
        });
    }
}

fn explanation_wire(prompt_text: String) -> Vec<WireMessage> {
    vec![
        WireMessage {
            role: "system",
            content: EXPLAINER_SYSTEM_PROMPT.to_string(),
        },
        WireMessage {
            role: "user",
            content: prompt_text,
        },
    ]
}

/// Projects the transcript onto the wire format: role and content only, the
/// author-tag convention is dropped.
fn conversation_wire(transcript: &[Message]) -> Vec<WireMessage> {
    transcript
        .iter()
        .map(|message| WireMessage {
            role: message.role.as_str(),
            content: message.content.clone(),
        })
        .collect()
}

async fn request_completion(
    http: &Client,
    url: &str,
    api_key: &str,
    request: &CompletionRequest,
) -> Result<String, ExplainerError> {
    let response = http
        .post(url)
        .header("api-key", api_key)
        .json(request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        return Err(ExplainerError::Api {
            status,
            message: api_error_message(&body),
        });
    }

    let parsed: CompletionResponse = response.json().await?;
    extract_text(parsed)
}

fn extract_text(response: CompletionResponse) -> Result<String, ExplainerError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ExplainerError::EmptyResponse)
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    fn config() -> ExplainerConfig {
        ExplainerConfig {
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_key: "secret".to_string(),
            api_version: "2024-12-01-preview".to_string(),
            deployment: "gpt-4o".to_string(),
        }
    }

    #[test]
    fn completions_url_embeds_deployment_and_api_version() {
        assert_eq!(
            config().completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-12-01-preview"
        );
    }

    #[test]
    fn request_body_matches_the_service_contract() {
        let request = CompletionRequest {
            messages: explanation_wire("why?".to_string()),
            temperature: SAMPLING_TEMPERATURE,
            max_tokens: EXPLANATION_MAX_TOKENS,
        };

        let body = serde_json::to_value(&request).expect("request should serialize");
        let temperature = body["temperature"]
            .as_f64()
            .expect("temperature should be a number");
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "why?");
    }

    #[test]
    fn conversation_wire_keeps_order_and_drops_authors() {
        let mut session = SessionState::new();
        session.invite("Manager");
        session.submit("metaai, what do you think?");

        let wire = conversation_wire(session.messages());

        assert_eq!(wire.len(), session.messages().len());
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[1].role, "assistant");
        let last = wire.last().expect("submission should be present");
        assert_eq!(last.role, "user");
        // The display prefix stays inside the content, the author field does not
        // exist on the wire.
        assert_eq!(last.content, "Manager: metaai, what do you think?");
    }

    #[test]
    fn extract_text_takes_the_first_choice() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{
                "choices": [
                    {"message": {"role": "assistant", "content": "Because the score cleared 670."}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ]
            }"#,
        )
        .expect("fixture should parse");

        let text = extract_text(response).expect("first choice should be returned");
        assert_eq!(text, "Because the score cleared 670.");
    }

    #[test]
    fn extract_text_reports_empty_choices() {
        let response: CompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).expect("fixture should parse");
        assert!(matches!(
            extract_text(response),
            Err(ExplainerError::EmptyResponse)
        ));
    }

    #[test]
    fn api_error_message_prefers_the_structured_wrapper() {
        let structured = r#"{"error": {"code": "429", "message": "Rate limit exceeded"}}"#;
        assert_eq!(api_error_message(structured), "Rate limit exceeded");

        let opaque = "upstream gateway timeout";
        assert_eq!(api_error_message(opaque), opaque);
    }
}
