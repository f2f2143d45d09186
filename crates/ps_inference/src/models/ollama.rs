use std::fmt;

use anyhow::anyhow;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use ps_core::{DecodingParams, Error, Result, SummaryContext, TextGenerator, TextSummarizer};

use crate::prompts::{self, Prompt};
use crate::Config;

const DEFAULT_MODEL_URL: &str = "http://localhost:11434/gemma3:12b";
const DEFAULT_MODEL_NAME: &str = "gemma3:12b";
const DEFAULT_PORT: u16 = 11434;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaModelConfig {
    ollama_host: String,
    ollama_port: u16,
    model_name: String,
}

impl Default for OllamaModelConfig {
    fn default() -> Self {
        Self {
            ollama_host: "http://localhost".to_string(),
            ollama_port: DEFAULT_PORT,
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

impl OllamaModelConfig {
    /// Reads host, port and model from a URL such as
    /// `http://localhost:11434/gemma3:12b`. An explicit model name wins over
    /// the URL path.
    pub fn from_config(config: &Config) -> Result<Self> {
        let raw = config.model_url.as_deref().unwrap_or(DEFAULT_MODEL_URL);
        let parsed = Url::parse(raw)
            .map_err(|e| Error::External(anyhow!("Invalid Ollama URL '{}': {}", raw, e)))?;

        let path_model = parsed.path().trim_start_matches('/').to_string();
        let model_name = match &config.model_name {
            Some(name) => name.clone(),
            None if !path_model.is_empty() => path_model,
            None => DEFAULT_MODEL_NAME.to_string(),
        };

        Ok(Self {
            ollama_host: format!(
                "{}://{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or("localhost")
            ),
            ollama_port: parsed.port().unwrap_or(DEFAULT_PORT),
            model_name,
        })
    }

    pub fn get_ollama_host(&self) -> &str {
        &self.ollama_host
    }

    pub fn get_ollama_port(&self) -> u16 {
        self.ollama_port
    }

    pub fn get_model_name(&self) -> &str {
        &self.model_name
    }

    fn endpoint(&self) -> String {
        format!("{}:{}/api/generate", self.ollama_host, self.ollama_port)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    system: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaModel {
    client: Client,
    config: OllamaModelConfig,
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

impl OllamaModel {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            config: OllamaModelConfig::from_config(config)?,
        })
    }

    async fn complete(&self, prompt: Prompt, max_tokens: u32) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.get_model_name(),
            prompt: prompt.user,
            system: prompt.system,
            stream: false,
            options: GenerateOptions { num_predict: max_tokens },
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                Error::Unavailable(format!(
                    "Ollama is not reachable at {}:{}: {}",
                    self.config.get_ollama_host(),
                    self.config.get_ollama_port(),
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Ollama returned {} for model '{}': {}",
                status,
                self.config.get_model_name(),
                body
            )));
        }

        let body = response.json::<GenerateResponse>().await?;
        Ok(body.response.trim().to_string())
    }
}

#[async_trait::async_trait]
impl TextGenerator for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn generate(&self, title: &str, params: &DecodingParams) -> Result<String> {
        self.complete(prompts::abstract_prompt(title, params), params.max_tokens)
            .await
    }
}

#[async_trait::async_trait]
impl TextSummarizer for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn summarize(
        &self,
        text: &str,
        params: &DecodingParams,
        context: &SummaryContext,
    ) -> Result<String> {
        self.complete(prompts::summary_prompt(text, params, context), params.max_tokens)
            .await
    }
}
