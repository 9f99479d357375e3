/// Errors that can occur across the Kestrel review bot.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate reports it through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use kestrel_core::KestrelError;
///
/// let err = KestrelError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum KestrelError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// GitHub API failure.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
