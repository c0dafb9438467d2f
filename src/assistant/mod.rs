//! LLM-backed helpers.
//!
//! The model sits behind [`LanguageModel`] so the flows can be exercised
//! with a canned model in tests. Each call is one request: no retries.

pub mod client;
pub mod flows;

pub use client::{ClientConfig, OllamaClient};
pub use flows::{predict_future_gpa, suggest_study_sessions, PredictionOutcome};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Message in a chat exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A text-generation service.
#[allow(async_fn_in_trait)]
pub trait LanguageModel {
    /// Send one chat exchange and return the reply text. With `json_output`
    /// the service is asked to answer with a JSON document.
    async fn chat(&self, messages: &[ChatMessage], json_output: bool) -> Result<String>;
}
