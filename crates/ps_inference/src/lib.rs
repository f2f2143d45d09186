use std::fmt;
use std::time::Duration;

pub mod models;
pub mod pipeline;
pub mod prompts;

/// Backend connection settings shared by the model factories.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub model_url: Option<String>,
    pub retries: u32,
    pub retry_base_delay: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("model_url", &self.model_url)
            .field("retries", &self.retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: None,
            model_url: None,
            retries: 3,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

pub mod prelude {
    pub use super::models::{create_generator, create_summarizer, ModelKind};
    pub use super::pipeline::{AbstractGenerator, Pipeline, StyleSummarizer};
    pub use super::Config;
    pub use ps_core::{Error, Length, PipelineResult, Result, Style, StyleConfig};
}

pub use models::{create_generator, create_summarizer, ModelKind};
pub use pipeline::{AbstractGenerator, Pipeline, StyleSummarizer};
