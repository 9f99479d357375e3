use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KestrelError;

/// Top-level configuration for a review run.
///
/// Supports layered resolution: CLI flags > env vars > `.kestrel.toml` > defaults.
/// The struct is passed by value into the components that need it; there is no
/// global configuration lookup.
///
/// # Examples
///
/// ```
/// use kestrel_core::{BotConfig, LlmProvider};
///
/// let config = BotConfig::default();
/// assert_eq!(config.llm.provider, LlmProvider::OpenAi);
/// assert_eq!(config.llm.temperature, 0.3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmSettings,
    /// Print run statistics to stderr.
    #[serde(default)]
    pub verbose: bool,
}

impl BotConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Io`] if the file cannot be read, or
    /// [`KestrelError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use kestrel_core::BotConfig;
    /// use std::path::Path;
    ///
    /// let config = BotConfig::from_file(Path::new(".kestrel.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, KestrelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel_core::{BotConfig, LlmProvider};
    ///
    /// let toml = r#"
    /// [llm]
    /// provider = "google"
    /// temperature = 0.2
    /// "#;
    /// let config = BotConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.llm.provider, LlmProvider::Google);
    /// assert_eq!(config.llm.temperature, 0.2);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, KestrelError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// The text-completion provider backing the review pipeline.
///
/// Kestrel supports exactly two providers; anything else is a configuration
/// error at parse time rather than a runtime branch miss.
///
/// # Examples
///
/// ```
/// use kestrel_core::LlmProvider;
///
/// let provider: LlmProvider = "openai".parse().unwrap();
/// assert_eq!(provider, LlmProvider::OpenAi);
/// assert!("mistral".parse::<LlmProvider>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI chat-completions endpoint.
    #[default]
    OpenAi,
    /// Google Gemini generateContent endpoint.
    Google,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::OpenAi => write!(f, "openai"),
            LlmProvider::Google => write!(f, "google"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "google" => Ok(LlmProvider::Google),
            other => Err(format!(
                "unsupported LLM provider: {other} (expected 'openai' or 'google')"
            )),
        }
    }
}

/// LLM provider settings.
///
/// # Examples
///
/// ```
/// use kestrel_core::LlmSettings;
///
/// let settings = LlmSettings::default();
/// assert!(settings.model.is_none());
/// assert_eq!(settings.temperature, 0.3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider to send completions to.
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model identifier; `None` uses the provider's default model.
    pub model: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// API key for the OpenAI provider.
    pub openai_api_key: Option<String>,
    /// API key for the Google provider.
    pub google_api_key: Option<String>,
}

fn default_temperature() -> f64 {
    0.3
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            temperature: default_temperature(),
            openai_api_key: None,
            google_api_key: None,
        }
    }
}
