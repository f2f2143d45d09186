use std::fmt;

use async_trait::async_trait;

use crate::types::{DecodingParams, SummaryContext};
use crate::Result;

/// A text-to-text generation capability (stage 1).
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Produce an abstract for `title` within the given decoding bounds.
    async fn generate(&self, title: &str, params: &DecodingParams) -> Result<String>;
}

/// An abstractive summarization capability (stage 2).
#[async_trait]
pub trait TextSummarizer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Summarize `text` within the given decoding bounds, following the
    /// style and length carried by `context`.
    async fn summarize(
        &self,
        text: &str,
        params: &DecodingParams,
        context: &SummaryContext,
    ) -> Result<String>;
}
