use std::fmt;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::Instrument;
use uuid::Uuid;

use ps_core::{
    DecodingParams, DecodingTable, Error, GenerationRequest, Length, PipelineResult, Result,
    Style, StyleConfig, SummaryContext,
};

mod stages;

pub use stages::{AbstractGenerator, StyleSummarizer};

/// Title → abstract → styled summary.
///
/// Both models are shared, read-only resources. Runs hold a device permit for
/// their whole duration, so at most `max_concurrent_runs` of them touch the
/// model runtime at once (one by default).
pub struct Pipeline {
    generator: AbstractGenerator,
    summarizer: StyleSummarizer,
    table: DecodingTable,
    device: Semaphore,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("generator", &self.generator)
            .field("summarizer", &self.summarizer)
            .field("table", &self.table)
            .field("available_permits", &self.device.available_permits())
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        generator: AbstractGenerator,
        summarizer: StyleSummarizer,
        table: DecodingTable,
    ) -> Result<Self> {
        table.validate()?;
        Ok(Self {
            generator,
            summarizer,
            table,
            device: Semaphore::new(1),
        })
    }

    pub fn with_max_concurrent_runs(mut self, runs: usize) -> Self {
        self.device = Semaphore::new(runs.max(1));
        self
    }

    pub fn table(&self) -> &DecodingTable {
        &self.table
    }

    pub fn generator(&self) -> &AbstractGenerator {
        &self.generator
    }

    pub fn summarizer(&self) -> &StyleSummarizer {
        &self.summarizer
    }

    pub fn resolve(&self, style: Style, length: Length) -> Result<DecodingParams> {
        self.table.resolve(style, length)
    }

    pub async fn run_request(
        &self,
        request: &GenerationRequest,
        config: StyleConfig,
    ) -> Result<PipelineResult> {
        self.run(&request.title, config.style, config.length).await
    }

    pub async fn run(&self, title: &str, style: Style, length: Length) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "pipeline_run",
            %run_id,
            style = style.id(),
            length = length.id()
        );

        let result = self.execute(title, style, length).instrument(span.clone()).await;
        if let Err(e) = &result {
            span.in_scope(|| match e.stage() {
                Some(stage) => tracing::error!("{} failed: {}", stage, e),
                None => tracing::error!("Pipeline run failed: {}", e),
            });
        }
        result
    }

    async fn execute(&self, title: &str, style: Style, length: Length) -> Result<PipelineResult> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Generation(
                "Please provide a paper title before continuing.".to_string(),
            ));
        }
        let params = self.table.resolve(style, length)?;

        let _permit = self
            .device
            .acquire()
            .await
            .map_err(|_| Error::Generation("model runtime is shut down".to_string()))?;

        let started = Instant::now();
        tracing::info!(
            "🧠 Stage 1: generating abstract for '{}' using {}",
            title,
            self.generator.model_name()
        );
        let abstract_text = self.generator.generate(title).await?;
        tracing::info!(
            "Stage 1 done in {:?} ({} words)",
            started.elapsed(),
            abstract_text.split_whitespace().count()
        );

        let started = Instant::now();
        tracing::info!(
            "✍️ Stage 2: summarizing with {} (max_tokens={})",
            self.summarizer.model_name(),
            params.max_tokens
        );
        let context = SummaryContext {
            title: title.to_string(),
            style,
            length,
        };
        let summary_text = self
            .summarizer
            .summarize(&abstract_text, &params, &context)
            .await?;
        tracing::info!(
            "Stage 2 done in {:?} ({} words)",
            started.elapsed(),
            summary_text.split_whitespace().count()
        );

        Ok(PipelineResult {
            abstract_text,
            summary_text,
        })
    }

    /// Stops accepting runs. Runs already holding a permit finish normally.
    pub fn shutdown(&self) {
        self.device.close();
        tracing::info!("Model runtime shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.device.is_closed()
    }
}
