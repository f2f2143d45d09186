use std::fmt;
use std::sync::Arc;

use ps_core::{
    AbstractBand, DecodingParams, Error, Result, Stage, SummaryContext, TextGenerator,
    TextSummarizer,
};

/// Stage 1: title in, synthetic four-part abstract out.
pub struct AbstractGenerator {
    model: Arc<dyn TextGenerator>,
    params: DecodingParams,
}

impl fmt::Debug for AbstractGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbstractGenerator")
            .field("model", &self.model.name())
            .field("params", &self.params)
            .finish()
    }
}

impl AbstractGenerator {
    pub fn new(model: Arc<dyn TextGenerator>, band: &AbstractBand) -> Result<Self> {
        Ok(Self {
            model,
            params: band.to_params()?,
        })
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn params(&self) -> &DecodingParams {
        &self.params
    }

    /// Single call to the model, no retry. Whatever the model returns is
    /// passed on as long as it is not empty.
    pub async fn generate(&self, title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Generation("paper title is empty".to_string()));
        }

        let text = self
            .model
            .generate(title, &self.params)
            .await
            .map_err(|e| e.at_stage(Stage::Generation))?;

        if text.trim().is_empty() {
            return Err(Error::Generation(format!(
                "{} returned an empty abstract",
                self.model.name()
            )));
        }
        Ok(text)
    }
}

/// Stage 2: abstract in, styled summary out.
pub struct StyleSummarizer {
    model: Arc<dyn TextSummarizer>,
}

impl fmt::Debug for StyleSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSummarizer")
            .field("model", &self.model.name())
            .finish()
    }
}

impl StyleSummarizer {
    pub fn new(model: Arc<dyn TextSummarizer>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn summarize(
        &self,
        text: &str,
        params: &DecodingParams,
        context: &SummaryContext,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::Summarization("text to summarize is empty".to_string()));
        }

        let summary = self
            .model
            .summarize(text, params, context)
            .await
            .map_err(|e| e.at_stage(Stage::Summarization))?;

        if summary.trim().is_empty() {
            return Err(Error::Summarization(format!(
                "{} returned an empty summary",
                self.model.name()
            )));
        }
        Ok(summary)
    }
}
