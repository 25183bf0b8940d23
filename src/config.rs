//! Service configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Completion endpoint settings.
///
/// The service talks to an OpenAI-compatible server hosting the fine-tuned
/// adapter; the defaults point at a local inference server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the completion endpoint (e.g. "http://localhost:8000/v1").
    pub base_url: String,
    /// Model name as served by the endpoint.
    pub model: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Maximum tokens to generate per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Context window of the model; prompts that would overflow it are rejected.
    pub context_window: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/v1".to_string(),
            model: "sales-sql-adapter".to_string(),
            api_key: None,
            max_tokens: 100,
            temperature: 0.1,
            context_window: 2048,
        }
    }
}

impl LlmConfig {
    /// Build from environment variables, falling back to defaults.
    ///
    /// Reads `ASKDB_LLM_BASE_URL`, `ASKDB_LLM_MODEL`, and
    /// `ASKDB_LLM_API_KEY` (or `OPENAI_API_KEY`).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("ASKDB_LLM_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("ASKDB_LLM_MODEL") {
            config.model = model;
        }
        config.api_key = std::env::var("ASKDB_LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok();

        config
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Path to the SQLite database.
    pub database_path: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Completion endpoint settings.
    pub llm: LlmConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("sales_data.db"),
            bind_addr: "0.0.0.0:8000".to_string(),
            llm: LlmConfig::default(),
        }
    }
}
