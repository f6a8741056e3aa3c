//! The LLM capability: a narrow interface the Director consumes for
//! plausibility scoring, free-form outcome generation, and trait proposal.
//! Every implementation must cope with unavailability by returning a bounded
//! fallback — an `ExternalUnavailable` condition is recovered locally and
//! never surfaces as a turn failure.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Abstract LLM provider capability. `generate_structured` is the primary
/// entry point the Director uses; `generate` backs free-form narration.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, prompt: &str, system_prompt: Option<&str>, temperature: f32, max_tokens: u32) -> String;

    async fn generate_structured(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f32,
        max_tokens: u32,
    ) -> Map<String, Value>;

    fn is_available(&self) -> bool;

    fn model_name(&self) -> &str;
}

/// Parse a structured-output response that may be wrapped in a markdown code
/// fence (```json ... ```). Malformed input returns an empty map rather than
/// propagating an error through the pipeline.
pub fn parse_structured_response(raw: &str) -> Map<String, Value> {
    let trimmed = raw.trim();
    let unfenced = strip_code_fence(trimmed);
    match serde_json::from_str::<Value>(unfenced) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn strip_code_fence(s: &str) -> &str {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        let rest = rest.trim_start_matches('\n');
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim();
        }
        return rest.trim();
    }
    s
}

/// HTTP-backed provider speaking an Ollama-shaped `/api/generate` endpoint —
/// the default local model runner for this kind of single-player text RPG.
/// Falls back to unavailable on any transport or timeout error; never panics
/// and never propagates the error through the pipeline.
pub struct HttpLlmProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpLlmProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    async fn call(&self, prompt: &str, system_prompt: Option<&str>, temperature: f32) -> Option<String> {
        let full_prompt = match system_prompt {
            Some(sys) => format!("{sys}\n\n{prompt}"),
            None => prompt.to_string(),
        };
        let body = serde_json::json!({
            "model": self.model,
            "prompt": full_prompt,
            "stream": false,
            "options": { "temperature": temperature },
        });

        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .ok()?;
        let parsed: Value = resp.json().await.ok()?;
        parsed.get("response").and_then(|v| v.as_str()).map(str::to_string)
    }
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    async fn generate(&self, prompt: &str, system_prompt: Option<&str>, temperature: f32, _max_tokens: u32) -> String {
        match self.call(prompt, system_prompt, temperature).await {
            Some(text) => text,
            None => {
                crate::error::log_external_unavailable("llm", "generate call failed or timed out");
                String::new()
            }
        }
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f32,
        _max_tokens: u32,
    ) -> Map<String, Value> {
        match self.call(prompt, system_prompt, temperature).await {
            Some(text) => parse_structured_response(&text),
            None => {
                crate::error::log_external_unavailable("llm", "generate_structured call failed or timed out");
                Map::new()
            }
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// A provider that is never available — used when no LLM is configured, and
/// in tests. Every call returns the bounded fallback immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLlmProvider;

#[async_trait]
impl LlmProvider for NullLlmProvider {
    async fn generate(&self, _prompt: &str, _system_prompt: Option<&str>, _temperature: f32, _max_tokens: u32) -> String {
        String::new()
    }

    async fn generate_structured(
        &self,
        _prompt: &str,
        _system_prompt: Option<&str>,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Map<String, Value> {
        Map::new()
    }

    fn is_available(&self) -> bool {
        false
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"plausibility\": 0.8}\n```";
        let parsed = parse_structured_response(raw);
        assert_eq!(parsed.get("plausibility").and_then(|v| v.as_f64()), Some(0.8));
    }

    #[test]
    fn parses_bare_json() {
        let raw = "{\"ability\": \"dexterity\"}";
        let parsed = parse_structured_response(raw);
        assert_eq!(parsed.get("ability").and_then(|v| v.as_str()), Some("dexterity"));
    }

    #[test]
    fn malformed_input_returns_empty_map() {
        assert!(parse_structured_response("not json at all").is_empty());
    }
}
