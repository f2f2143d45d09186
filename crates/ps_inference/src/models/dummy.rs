use std::fmt;

use ps_core::{DecodingParams, Result, SummaryContext, TextGenerator, TextSummarizer};

/// Offline backend. Output is a pure function of the input, which makes it
/// usable for demos and for exercising the pipeline end to end.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

const FILLER: &str = "Further experiments across additional settings confirm the robustness of these findings.";

#[async_trait::async_trait]
impl TextGenerator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, title: &str, params: &DecodingParams) -> Result<String> {
        let (min_words, max_words) = params.word_bounds();
        let mut text = format!(
            "Motivation: Work on \"{title}\" addresses a gap left by earlier approaches. \
             Method: We introduce the approach behind \"{title}\" and describe its components in detail. \
             Results: Evaluations show consistent improvements over strong baselines. \
             Conclusion: \"{title}\" points to a simpler and more effective direction for future work."
        );
        while text.split_whitespace().count() < min_words as usize {
            text.push(' ');
            text.push_str(FILLER);
        }
        let words: Vec<&str> = text.split_whitespace().take(max_words as usize).collect();
        Ok(words.join(" "))
    }
}

#[async_trait::async_trait]
impl TextSummarizer for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(
        &self,
        text: &str,
        params: &DecodingParams,
        context: &SummaryContext,
    ) -> Result<String> {
        let (_, max_words) = params.word_bounds();
        let words: Vec<&str> = text.split_whitespace().take(max_words as usize).collect();
        Ok(format!("[{}] {}", context.style.label(), words.join(" ")))
    }
}
