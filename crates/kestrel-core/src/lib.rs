//! Core types, configuration, and error handling for the Kestrel review bot.
//!
//! This crate provides the shared foundation used by the other Kestrel crates:
//! - [`KestrelError`] — unified error type using `thiserror`
//! - [`BotConfig`] — configuration loaded from flags, environment, and `.kestrel.toml`
//! - Shared types: [`PrContext`], [`ChangedFile`], [`ReviewState`]

mod config;
mod error;
mod types;

pub use config::{BotConfig, LlmProvider, LlmSettings};
pub use error::KestrelError;
pub use types::{ChangedFile, PrContext, ReviewState};

/// A convenience `Result` type for Kestrel operations.
pub type Result<T> = std::result::Result<T, KestrelError>;
