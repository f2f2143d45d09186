use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Explanation style requested for the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    BeginnerFriendly,
    Technical,
    CodeOriented,
    Mathematical,
    HistoricalContext,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::BeginnerFriendly,
        Style::Technical,
        Style::CodeOriented,
        Style::Mathematical,
        Style::HistoricalContext,
    ];

    /// Stable identifier used on the wire and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Style::BeginnerFriendly => "beginner-friendly",
            Style::Technical => "technical",
            Style::CodeOriented => "code-oriented",
            Style::Mathematical => "mathematical",
            Style::HistoricalContext => "historical-context",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Style::BeginnerFriendly => "Beginner-Friendly",
            Style::Technical => "Technical",
            Style::CodeOriented => "Code-Oriented",
            Style::Mathematical => "Mathematical",
            Style::HistoricalContext => "Historical Context",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Style::ALL
            .into_iter()
            .find(|style| {
                style.id().eq_ignore_ascii_case(needle) || style.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| Error::Configuration(format!("Unknown style: {}", s)))
    }
}

/// Target length of the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Length {
    Short,
    Medium,
    Long,
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    pub fn id(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Length::Short => "Short (1-2 paragraphs)",
            Length::Medium => "Medium (3-5 paragraphs)",
            Length::Long => "Long (detailed explanation)",
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Length {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Length::ALL
            .into_iter()
            .find(|length| {
                length.id().eq_ignore_ascii_case(needle) || length.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| Error::Configuration(format!("Unknown length: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleConfig {
    pub style: Style,
    pub length: Length,
}

impl StyleConfig {
    pub fn new(style: Style, length: Length) -> Self {
        Self { style, length }
    }
}

/// Token bounds and beam width governing one model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecodingParams {
    pub min_tokens: u32,
    pub max_tokens: u32,
    pub beam_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub title: String,
}

impl GenerationRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub abstract_text: String,
    pub summary_text: String,
}

/// What the summarizer needs to know besides the text and its token budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryContext {
    pub title: String,
    pub style: Style,
    pub length: Length,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Generation,
    Summarization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generation => f.write_str("Stage 1 (Abstract Generation)"),
            Stage::Summarization => f.write_str("Stage 2 (Summarization)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parses_ids_and_labels() {
        assert_eq!("technical".parse::<Style>().unwrap(), Style::Technical);
        assert_eq!("Beginner-Friendly".parse::<Style>().unwrap(), Style::BeginnerFriendly);
        assert_eq!("historical context".parse::<Style>().unwrap(), Style::HistoricalContext);
        assert_eq!(" CODE-ORIENTED ".parse::<Style>().unwrap(), Style::CodeOriented);
    }

    #[test]
    fn test_unknown_style_is_configuration_error() {
        let err = "Poetic".parse::<Style>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(err.to_string(), "Configuration error: Unknown style: Poetic");
    }

    #[test]
    fn test_length_parses_ids_and_labels() {
        assert_eq!("short".parse::<Length>().unwrap(), Length::Short);
        assert_eq!("Medium (3-5 paragraphs)".parse::<Length>().unwrap(), Length::Medium);
        assert!(matches!("tiny".parse::<Length>(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_serde_uses_ids() {
        let config = StyleConfig::new(Style::BeginnerFriendly, Length::Long);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"style":"beginner-friendly","length":"long"}"#);

        for style in Style::ALL {
            let json = serde_json::to_string(&style).unwrap();
            assert_eq!(json, format!("\"{}\"", style.id()));
        }
    }
}
