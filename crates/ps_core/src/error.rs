use thiserror::Error;

use crate::types::Stage;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// The pipeline stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Generation(_) => Some(Stage::Generation),
            Error::Summarization(_) => Some(Stage::Summarization),
            _ => None,
        }
    }

    /// Re-labels a backend failure as a failure of `stage`. Errors that
    /// already carry a stage are returned untouched.
    pub fn at_stage(self, stage: Stage) -> Self {
        if self.stage().is_some() {
            return self;
        }
        match stage {
            Stage::Generation => Error::Generation(self.to_string()),
            Stage::Summarization => Error::Summarization(self.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
