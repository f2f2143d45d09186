use ps_core::{DecodingParams, SummaryContext};

/// A system instruction paired with the user turn it frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const ABSTRACT_SYSTEM: &str = "You are an academic writer and expert in AI. Your task is to generate a detailed, \
high-quality, and professionally structured abstract for a machine learning research paper. \
The abstract must include the motivation, method, results, and conclusion.";

const SUMMARY_SYSTEM: &str = "You are a skilled explainer. Your task is to summarize a complex research paper \
abstract. You must adhere strictly to the requested style and length. Do not add any introductory or \
concluding phrases outside of the summary content.";

pub fn abstract_prompt(title: &str, params: &DecodingParams) -> Prompt {
    let (min_words, max_words) = params.word_bounds();
    Prompt {
        system: ABSTRACT_SYSTEM.to_string(),
        user: format!(
            "Write a detailed abstract of {} to {} words for a research paper titled '{}'. \
             Structure it as Motivation, Method, Results and Conclusion.",
            min_words, max_words, title
        ),
    }
}

pub fn summary_prompt(text: &str, params: &DecodingParams, context: &SummaryContext) -> Prompt {
    let (min_words, max_words) = params.word_bounds();
    Prompt {
        system: SUMMARY_SYSTEM.to_string(),
        user: format!(
            "Summarize the following research paper abstract for the paper titled '{}'. \
             The explanation should be written in a **{}** style, and the summary length \
             must be **{}** (between {} and {} words), focusing on core findings and implications. \
             Abstract to summarize: \n\n{}",
            context.title,
            context.style.label(),
            context.length.label(),
            min_words,
            max_words,
            text
        ),
    }
}
