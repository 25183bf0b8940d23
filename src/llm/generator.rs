//! Completion client for the fine-tuned question-to-SQL model.

use crate::config::LlmConfig;
use crate::types::error::{Result, ServiceError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tiktoken_rs::CoreBPE;

/// Instruction prompt with a single few-shot example, in the format the
/// adapter was tuned on. `{question}` and `{context}` are substituted per
/// request.
const PROMPT_TEMPLATE: &str = "Below is an instruction that describes a task, paired with an input that provides further context. Write a response that appropriately completes the request.

### Instruction:
Convert the following question to a SQL query for a SQLite database. Only output the SQL query, nothing else.

Example:
Question: How many products are there?
SQL: SELECT COUNT(*) FROM products

Question: {question}

### Input:
Database schema:
{context}

### Response:
";

/// Client for an OpenAI-compatible completion endpoint.
///
/// Constructed once at service startup and treated as read-only afterwards;
/// every request shares the same handle.
pub struct SqlGenerator {
    config: LlmConfig,
    client: Client,
    tokenizer: CoreBPE,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl SqlGenerator {
    /// Create a generator without touching the network.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let tokenizer = tiktoken_rs::cl100k_base()
            .map_err(|e| ServiceError::LlmError(format!("Failed to load tokenizer: {}", e)))?;

        Ok(Self {
            config,
            client: Client::new(),
            tokenizer,
        })
    }

    /// Create a generator and verify the completion endpoint is reachable.
    pub async fn connect(config: LlmConfig) -> Result<Self> {
        let generator = Self::new(config)?;
        generator.probe().await?;
        tracing::info!(
            model = %generator.config.model,
            base_url = %generator.config.base_url,
            "completion endpoint ready"
        );
        Ok(generator)
    }

    /// Check the endpoint's model listing answers.
    async fn probe(&self) -> Result<()> {
        let url = format!("{}/models", self.config.base_url);
        let mut request = self.client.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            ServiceError::LlmError(format!("Completion endpoint unreachable: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(ServiceError::LlmError(format!(
                "Completion endpoint returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Render the prompt for a question over the given schema text.
    pub fn build_prompt(&self, question: &str, schema_text: &str) -> String {
        PROMPT_TEMPLATE
            .replace("{question}", question)
            .replace("{context}", schema_text)
    }

    /// Number of tokens the prompt occupies.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer.encode_with_special_tokens(text).len()
    }

    /// Generate raw completion text for a question.
    ///
    /// The caller extracts the SQL candidate from the returned free text.
    pub async fn generate(&self, question: &str, schema_text: &str) -> Result<String> {
        let prompt = self.build_prompt(question, schema_text);

        let prompt_tokens = self.count_tokens(&prompt);
        let budget = self.config.max_tokens as usize;
        if prompt_tokens + budget > self.config.context_window {
            return Err(ServiceError::LlmError(format!(
                "Prompt of {} tokens plus {} reserved for generation exceeds the {}-token context window",
                prompt_tokens, budget, self.config.context_window
            )));
        }
        tracing::debug!(prompt_tokens, "calling completion endpoint");

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.config.model,
                "messages": [
                    {"role": "user", "content": prompt}
                ],
                "max_tokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::LlmError(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::LlmError(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ServiceError::LlmError(format!(
                "Completion endpoint error {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ServiceError::LlmError(format!("Failed to parse response: {}", e)))?;

        Ok(parsed
            .choices
            .first()
            .ok_or_else(|| ServiceError::LlmError("No completion returned".to_string()))?
            .message
            .content
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_substitutes_question_and_schema() {
        let generator = SqlGenerator::new(LlmConfig::default()).unwrap();
        let prompt = generator.build_prompt(
            "Which region sold the most?",
            "CREATE TABLE sales (id INTEGER)",
        );

        assert!(prompt.contains("Question: Which region sold the most?"));
        assert!(prompt.contains("CREATE TABLE sales (id INTEGER)"));
        assert!(prompt.trim_end().ends_with("### Response:"));
    }

    #[test]
    fn test_count_tokens_nonzero() {
        let generator = SqlGenerator::new(LlmConfig::default()).unwrap();
        assert!(generator.count_tokens("SELECT COUNT(*) FROM products") > 0);
    }

    #[tokio::test]
    async fn test_oversized_prompt_rejected() {
        let config = LlmConfig {
            context_window: 50,
            ..LlmConfig::default()
        };
        let generator = SqlGenerator::new(config).unwrap();

        let err = generator
            .generate("any question", "a very long schema")
            .await
            .unwrap_err();
        match err {
            ServiceError::LlmError(message) => assert!(message.contains("context window")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
