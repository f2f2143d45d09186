use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use ps_core::{DecodingParams, Error, Result, SummaryContext, TextGenerator, TextSummarizer};

use crate::prompts::{self, Prompt};
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

// Lower temperature for summarization, higher for creation.
const GENERATION_TEMPERATURE: f32 = 0.9;
const SUMMARY_TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl Content {
    fn text(text: String) -> Self {
        Self { parts: vec![Part { text }] }
    }
}

enum Attempt {
    Retryable(Error),
    Fatal(Error),
}

pub struct GeminiModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retries: u32,
    retry_base_delay: Duration,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("retries", &self.retries)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Unavailable("Gemini API key is required".to_string()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config
                .model_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config
                .model_name
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            retries: config.retries.max(1),
            retry_base_delay: config.retry_base_delay,
        })
    }

    async fn complete(&self, prompt: Prompt, max_tokens: u32, temperature: f32) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let request = GenerateContentRequest {
            contents: vec![Content::text(prompt.user)],
            system_instruction: Content::text(prompt.system),
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
                temperature,
            },
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send(&url, &request).await {
                Ok(text) => return Ok(text),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retryable(e)) if attempt < self.retries => {
                    let wait = self.retry_base_delay * 2u32.pow(attempt - 1);
                    tracing::warn!(
                        "Gemini call failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt,
                        self.retries,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(Attempt::Retryable(e)) => {
                    return Err(Error::Unavailable(format!(
                        "Final API call failed after {} attempts: {}",
                        self.retries, e
                    )));
                }
            }
        }
    }

    async fn send(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<String, Attempt> {
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| Attempt::Retryable(Error::Http(e)))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(Attempt::Fatal(Error::Unavailable(
                "API key is missing or invalid (403 Forbidden)".to_string(),
            )));
        }
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Attempt::Retryable(Error::Inference(format!(
                "Gemini returned {}",
                status
            ))));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Attempt::Fatal(Error::Inference(format!(
                "Gemini returned {}: {}",
                status, body
            ))));
        }

        let body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| Attempt::Fatal(Error::Http(e)))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| {
                Attempt::Fatal(Error::Inference(
                    "Gemini response contained no candidate text".to_string(),
                ))
            })
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, title: &str, params: &DecodingParams) -> Result<String> {
        tracing::debug!(
            "Gemini does not expose beam search; ignoring beam_count={}",
            params.beam_count
        );
        let prompt = prompts::abstract_prompt(title, params);
        self.complete(prompt, params.max_tokens, GENERATION_TEMPERATURE).await
    }
}

#[async_trait::async_trait]
impl TextSummarizer for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn summarize(
        &self,
        text: &str,
        params: &DecodingParams,
        context: &SummaryContext,
    ) -> Result<String> {
        let prompt = prompts::summary_prompt(text, params, context);
        self.complete(prompt, params.max_tokens, SUMMARY_TEMPERATURE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps_core::{Length, Style};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> Config {
        Config {
            api_key: Some("test-key".to_string()),
            model_name: Some("gemini-test".to_string()),
            model_url: Some(server.uri()),
            retries: 3,
            retry_base_delay: Duration::from_millis(0),
        }
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = GeminiModel::new(&Config::default());
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Model unavailable: Gemini API key is required"
        );

        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        assert!(GeminiModel::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_generate_sends_budget_and_trims_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "maxOutputTokens": 266 }
            })))
            .respond_with(reply("  Motivation: ...  "))
            .expect(1)
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server)).unwrap();
        let params = DecodingParams { min_tokens: 133, max_tokens: 266, beam_count: 4 };
        let text = model.generate("Attention Is All You Need", &params).await.unwrap();
        assert_eq!(text, "Motivation: ...");
    }

    #[tokio::test]
    async fn test_summarize_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "generationConfig": { "maxOutputTokens": 60 }
            })))
            .respond_with(reply("A short summary."))
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server)).unwrap();
        let params = DecodingParams { min_tokens: 24, max_tokens: 60, beam_count: 4 };
        let context = SummaryContext {
            title: "Attention Is All You Need".to_string(),
            style: Style::Technical,
            length: Length::Short,
        };
        let summary = model.summarize("An abstract.", &params, &context).await.unwrap();
        assert_eq!(summary, "A short summary.");
    }

    #[tokio::test]
    async fn test_forbidden_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server)).unwrap();
        let params = DecodingParams { min_tokens: 133, max_tokens: 266, beam_count: 4 };
        let err = model.generate("BERT", &params).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_gives_up_after_configured_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server)).unwrap();
        let params = DecodingParams { min_tokens: 133, max_tokens: 266, beam_count: 4 };
        let err = model.generate("BERT", &params).await.unwrap_err();
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_missing_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server)).unwrap();
        let params = DecodingParams { min_tokens: 133, max_tokens: 266, beam_count: 4 };
        let err = model.generate("BERT", &params).await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }
}
