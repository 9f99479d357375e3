use std::time::Duration;

use kestrel_core::{KestrelError, LlmProvider, LlmSettings};
use serde::{Deserialize, Serialize};

const OPENAI_API_BASE: &str = "https://api.openai.com";
const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model per provider, used when the configuration names none.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Default model for the Google provider.
pub const DEFAULT_GOOGLE_MODEL: &str = "gemini-1.5-flash";

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use kestrel_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Review this diff".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use kestrel_review::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
}

/// A callable that turns a rendered prompt into generated text.
///
/// The pipeline only ever talks to this trait; [`LlmClient`] is the
/// production implementation and tests substitute a scripted stub.
#[async_trait::async_trait]
pub trait CompletionModel {
    /// Send one completion request and return the generated text.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, KestrelError>;
}

#[derive(Debug)]
enum Backend {
    OpenAi { api_key: String },
    Google { api_key: String },
}

/// Text-completion client bound to one provider, model, and key.
///
/// Construction fails when the selected provider's API key is absent; there
/// is no fallback between providers.
///
/// # Examples
///
/// ```
/// use kestrel_core::LlmSettings;
/// use kestrel_review::llm::LlmClient;
///
/// let settings = LlmSettings {
///     openai_api_key: Some("sk-test".into()),
///     ..LlmSettings::default()
/// };
/// let client = LlmClient::new(&settings).unwrap();
/// assert_eq!(client.model(), "gpt-4o-mini");
/// ```
#[derive(Debug)]
pub struct LlmClient {
    http: reqwest::Client,
    backend: Backend,
    model: String,
    temperature: f64,
}

impl LlmClient {
    /// Create a client from provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Config`] if the selected provider's API key is
    /// missing, or [`KestrelError::Llm`] if the HTTP client cannot be built.
    pub fn new(settings: &LlmSettings) -> Result<Self, KestrelError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| KestrelError::Llm(format!("failed to create HTTP client: {e}")))?;

        let (backend, default_model) = match settings.provider {
            LlmProvider::OpenAi => {
                let api_key = settings
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| KestrelError::Config("OpenAI API key is not set".into()))?;
                (Backend::OpenAi { api_key }, DEFAULT_OPENAI_MODEL)
            }
            LlmProvider::Google => {
                let api_key = settings
                    .google_api_key
                    .clone()
                    .ok_or_else(|| KestrelError::Config("Google API key is not set".into()))?;
                (Backend::Google { api_key }, DEFAULT_GOOGLE_MODEL)
            }
        };

        let model = settings
            .model
            .clone()
            .unwrap_or_else(|| default_model.to_string());

        Ok(Self {
            http,
            backend,
            model,
            temperature: settings.temperature,
        })
    }

    /// Return the model name this client sends requests for.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Return the provider this client is bound to.
    pub fn provider(&self) -> LlmProvider {
        match self.backend {
            Backend::OpenAi { .. } => LlmProvider::OpenAi,
            Backend::Google { .. } => LlmProvider::Google,
        }
    }

    async fn complete_openai(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, KestrelError> {
        let url = format!("{OPENAI_API_BASE}/v1/chat/completions");

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| KestrelError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(KestrelError::Llm(format!(
                "OpenAI API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| KestrelError::Llm(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                KestrelError::Llm(format!("unexpected response structure: {response_body}"))
            })?;

        Ok(content.to_string())
    }

    async fn complete_google(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, KestrelError> {
        let url = format!(
            "{GOOGLE_API_BASE}/models/{}:generateContent?key={api_key}",
            self.model
        );

        // Gemini keeps system text out of the turn list.
        let system_parts: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| serde_json::json!({ "text": m.content }))
            .collect();
        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| {
                serde_json::json!({
                    "role": "user",
                    "parts": [{ "text": m.content }],
                })
            })
            .collect();

        let body = serde_json::json!({
            "systemInstruction": { "parts": system_parts },
            "contents": contents,
            "generationConfig": { "temperature": self.temperature },
        });

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| KestrelError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(KestrelError::Llm(format!(
                "Google API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| KestrelError::Llm(format!("failed to parse response: {e}")))?;

        let parts = response_body
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| {
                KestrelError::Llm(format!("unexpected response structure: {response_body}"))
            })?;

        let text = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(KestrelError::Llm(
                "Google API returned no text content".into(),
            ));
        }

        Ok(text)
    }
}

#[async_trait::async_trait]
impl CompletionModel for LlmClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, KestrelError> {
        match &self.backend {
            Backend::OpenAi { api_key } => self.complete_openai(api_key, &messages).await,
            Backend::Google { api_key } => self.complete_google(api_key, &messages).await,
        }
    }
}
