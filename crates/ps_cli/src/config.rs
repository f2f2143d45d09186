use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use ps_core::{AbstractBand, DecodingTable, Error, Result};
use ps_inference::{
    create_generator, create_summarizer, AbstractGenerator, Config, ModelKind, Pipeline,
    StyleSummarizer,
};

/// Contents of the optional TOML configuration file. Every section may be
/// omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub generator: BackendConfig,
    pub summarizer: BackendConfig,
    pub decoding: DecodingTable,
    #[serde(rename = "abstract")]
    pub abstract_band: AbstractBand,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub backend: String,
    pub model_name: Option<String>,
    pub model_url: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend: ModelKind::Gemini.id().to_string(),
            model_name: None,
            model_url: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            retries: 3,
        }
    }
}

impl BackendConfig {
    pub fn kind(&self) -> Result<ModelKind> {
        self.backend.parse()
    }

    pub fn to_inference_config(&self) -> Config {
        Config {
            api_key: std::env::var(&self.api_key_env).ok(),
            model_name: self.model_name.clone(),
            model_url: self.model_url.clone(),
            retries: self.retries,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub max_concurrent_runs: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 1,
        }
    }
}

/// Command line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub generator: Option<String>,
    pub summarizer: Option<String>,
    pub model_url: Option<String>,
    pub model_name: Option<String>,
    pub addr: Option<String>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw).map_err(|e| {
            Error::Configuration(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        info!("⚙️ Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(backend) = overrides.generator {
            self.generator.backend = backend;
        }
        if let Some(backend) = overrides.summarizer {
            self.summarizer.backend = backend;
        }
        for stage in [&mut self.generator, &mut self.summarizer] {
            if let Some(url) = &overrides.model_url {
                stage.model_url = Some(url.clone());
            }
            if let Some(name) = &overrides.model_name {
                stage.model_name = Some(name.clone());
            }
        }
        if let Some(addr) = overrides.addr {
            self.server.addr = addr;
        }
    }

    /// Startup checks. Any failure here is fatal.
    pub fn validate(&self) -> Result<()> {
        self.decoding.validate()?;
        self.abstract_band.validate()?;
        self.generator.kind()?;
        self.summarizer.kind()?;
        if self.runtime.max_concurrent_runs == 0 {
            return Err(Error::Configuration(
                "runtime.max_concurrent_runs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads both models once and wires them into a pipeline.
    pub fn build_pipeline(&self) -> Result<Arc<Pipeline>> {
        let generator = create_generator(
            self.generator.kind()?,
            &self.generator.to_inference_config(),
        )?;
        info!("🧠 Abstract generator loaded (using {})", generator.name());

        let summarizer = create_summarizer(
            self.summarizer.kind()?,
            &self.summarizer.to_inference_config(),
        )?;
        info!("🧠 Summarizer loaded (using {})", summarizer.name());

        let pipeline = Pipeline::new(
            AbstractGenerator::new(generator, &self.abstract_band)?,
            StyleSummarizer::new(summarizer),
            self.decoding.clone(),
        )?
        .with_max_concurrent_runs(self.runtime.max_concurrent_runs);
        Ok(Arc::new(pipeline))
    }
}
