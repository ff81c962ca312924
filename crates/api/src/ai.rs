//! Client for the chat-completions endpoint that turns a prompt into a
//! form schema and submissions into a report.
//!
//! When no API key is configured, [`Generator::generate`] answers from the
//! built-in templates and [`Generator::generate_report`] from the rule-based
//! analysis, without calling out.

use std::time::Duration;

use fieldform_core::generator::{
    mock_schema, parse_generated_schema, user_prompt, GeneratedSchemaError, SYSTEM_PROMPT,
};
use fieldform_core::report::{
    offline_analysis, parse_generated_analysis, report_prompt, GeneratedReportError, Report,
    ReportEntry, REPORT_SYSTEM_PROMPT,
};
use fieldform_core::schema::FieldSchema;
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 800;
const REPORT_MAX_TOKENS: u32 = 1500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur while generating through the model.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Model API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The completion carried no message content.
    #[error("Model returned an empty reply")]
    EmptyReply,

    /// The reply could not be turned into a schema.
    #[error(transparent)]
    Schema(#[from] GeneratedSchemaError),

    /// The reply could not be turned into a report.
    #[error(transparent)]
    Report(#[from] GeneratedReportError),
}

/// Model endpoint configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None` selects offline generation.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

impl AiConfig {
    /// Load from environment variables.
    ///
    /// | Env Var      | Default                                        |
    /// |--------------|------------------------------------------------|
    /// | `AI_API_KEY` | unset (offline generation)                     |
    /// | `AI_API_URL` | `https://api.openai.com/v1/chat/completions`   |
    /// | `AI_MODEL`   | `gpt-4o-mini`                                  |
    ///
    /// Empty keys and `your_..._here` placeholders count as unset.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("AI_API_KEY").ok().filter(|k| !is_placeholder(k)),
            api_url: std::env::var("AI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
        }
    }

    /// Offline configuration.
    pub fn disabled() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.into(),
            model: DEFAULT_MODEL.into(),
        }
    }
}

fn is_placeholder(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || (key.starts_with("your_") && key.ends_with("_here"))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Turns natural-language prompts into [`FieldSchema`]s and submissions
/// into [`Report`]s.
pub struct Generator {
    client: reqwest::Client,
    config: AiConfig,
}

impl Generator {
    pub fn new(config: AiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Whether prompts go to the model rather than the built-in templates.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Generate a schema for `prompt`. A non-empty `title` replaces the
    /// generated one.
    pub async fn generate(
        &self,
        prompt: &str,
        title: Option<&str>,
    ) -> Result<FieldSchema, GenerationError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!("No AI API key configured, using offline schema generation");
            return Ok(mock_schema(prompt, title));
        };

        let mut schema = self.request_schema(api_key, prompt).await?;
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            schema.title = title.to_string();
        }
        Ok(schema)
    }

    /// Build a report over `entries`. The summary is always computed
    /// locally; the model only contributes insights and recommendations.
    pub async fn generate_report(
        &self,
        entries: &[ReportEntry],
    ) -> Result<Report, GenerationError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!("No AI API key configured, using offline report analysis");
            return Ok(Report::new(entries, offline_analysis(entries)));
        };

        let user = report_prompt(entries)?;
        let content = self
            .complete(api_key, REPORT_SYSTEM_PROMPT, &user, REPORT_MAX_TOKENS)
            .await?;
        let analysis = parse_generated_analysis(&content)?;
        tracing::debug!(
            insights = analysis.insights.len(),
            recommendations = analysis.recommendations.len(),
            "Model generated report analysis"
        );
        Ok(Report::new(entries, analysis))
    }

    async fn request_schema(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<FieldSchema, GenerationError> {
        let user = user_prompt(prompt);
        let content = self
            .complete(api_key, SYSTEM_PROMPT, &user, MAX_TOKENS)
            .await?;
        let schema = parse_generated_schema(&content)?;
        tracing::debug!(title = %schema.title, fields = schema.fields.len(), "Model generated schema");
        Ok(schema)
    }

    /// Send one system + user exchange and return the first non-empty reply.
    async fn complete(
        &self,
        api_key: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let completion: ChatResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::EmptyReply)
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_keys_count_as_unset() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("your_openai_api_key_here"));
        assert!(is_placeholder("your_api_key_here"));
        assert!(!is_placeholder("sk-live-123"));
    }

    #[tokio::test]
    async fn offline_generation_uses_templates() {
        let generator = Generator::new(AiConfig::disabled());
        assert!(!generator.is_configured());

        let schema = generator
            .generate("electrical pole survey", Some("Grid North"))
            .await
            .unwrap();
        assert_eq!(schema.title, "Grid North");
        assert!(schema.field("voltage").is_some());
    }

    #[tokio::test]
    async fn offline_report_uses_rule_based_analysis() {
        use fieldform_core::approval::SubmissionStatus;
        use fieldform_core::schema::SubmittedData;

        let generator = Generator::new(AiConfig::disabled());
        let entries = vec![ReportEntry {
            form_title: "Pole Inspection".into(),
            status: SubmissionStatus::Approved,
            created_at: chrono::Utc::now(),
            alerted_fields: vec!["voltage".into()],
            data: SubmittedData::default(),
        }];

        let report = generator.generate_report(&entries).await.unwrap();
        assert_eq!(report.summary.total_submissions, 1);
        assert_eq!(report.summary.compliance_rate, 100.0);
        assert_eq!(report.insights[0].category, "Threshold alerts");
    }
}
