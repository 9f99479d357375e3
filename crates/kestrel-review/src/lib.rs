//! Review orchestration for the Kestrel bot.
//!
//! Provides the full review path: GitHub PR collection, LLM provider
//! clients, the three-stage prompt pipeline, and Markdown report rendering.

pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod report;
