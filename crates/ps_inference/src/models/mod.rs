use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ps_core::{Error, Result, TextGenerator, TextSummarizer};

use crate::Config;

pub mod dummy;
pub mod gemini;
pub mod ollama;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;
pub use ollama::OllamaModel;

/// Which backend serves a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Dummy,
    Gemini,
    Ollama,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Dummy, ModelKind::Gemini, ModelKind::Ollama];

    pub fn id(&self) -> &'static str {
        match self {
            ModelKind::Dummy => "dummy",
            ModelKind::Gemini => "gemini",
            ModelKind::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "Unknown model backend: {}. Available backends: dummy, gemini, ollama",
                    s
                ))
            })
    }
}

pub fn create_generator(kind: ModelKind, config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let model: Arc<dyn TextGenerator> = match kind {
        ModelKind::Dummy => Arc::new(DummyModel::new()),
        ModelKind::Gemini => Arc::new(GeminiModel::new(config)?),
        ModelKind::Ollama => Arc::new(OllamaModel::new(config)?),
    };
    tracing::debug!("Created generator backend {:?}", model);
    Ok(model)
}

pub fn create_summarizer(kind: ModelKind, config: &Config) -> Result<Arc<dyn TextSummarizer>> {
    let model: Arc<dyn TextSummarizer> = match kind {
        ModelKind::Dummy => Arc::new(DummyModel::new()),
        ModelKind::Gemini => Arc::new(GeminiModel::new(config)?),
        ModelKind::Ollama => Arc::new(OllamaModel::new(config)?),
    };
    tracing::debug!("Created summarizer backend {:?}", model);
    Ok(model)
}
