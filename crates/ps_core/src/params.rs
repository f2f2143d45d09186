//! Mapping from user-facing style/length choices to decoding bounds.
//!
//! The table is explicit: every `Length` has its own token budget and the
//! lower bound is derived from it with a fixed ratio. Style never changes the
//! budget; it only reaches the summarizer as a prompt modifier. A table whose
//! numbers cannot produce valid bounds is rejected by [`DecodingTable::validate`]
//! at startup rather than patched at request time.

use serde::{Deserialize, Serialize};

use crate::types::{DecodingParams, Length, Style, StyleConfig};
use crate::{Error, Result};

const TOKENS_PER_WORD_NUM: u32 = 4;
const TOKENS_PER_WORD_DEN: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingTable {
    pub short_max_tokens: u32,
    pub medium_max_tokens: u32,
    pub long_max_tokens: u32,
    pub min_ratio: f64,
    pub beam_count: u32,
}

impl Default for DecodingTable {
    fn default() -> Self {
        Self {
            short_max_tokens: 60,
            medium_max_tokens: 120,
            long_max_tokens: 200,
            min_ratio: 0.4,
            beam_count: 4,
        }
    }
}

impl DecodingTable {
    /// Resolve the decoding bounds for one (style, length) pair.
    pub fn resolve(&self, style: Style, length: Length) -> Result<DecodingParams> {
        let max_tokens = match length {
            Length::Short => self.short_max_tokens,
            Length::Medium => self.medium_max_tokens,
            Length::Long => self.long_max_tokens,
        };
        let min_tokens = (f64::from(max_tokens) * self.min_ratio).floor() as u32;
        let params = DecodingParams {
            min_tokens,
            max_tokens,
            beam_count: self.beam_count,
        };
        check_params(&params).map_err(|reason| {
            Error::Configuration(format!("{} for {}/{}", reason, style.id(), length.id()))
        })?;
        Ok(params)
    }

    pub fn resolve_config(&self, config: StyleConfig) -> Result<DecodingParams> {
        self.resolve(config.style, config.length)
    }

    /// Resolve from free-form names, as received from a form or command line.
    pub fn resolve_named(&self, style: &str, length: &str) -> Result<DecodingParams> {
        self.resolve(style.parse()?, length.parse()?)
    }

    /// Every (style, length) pair with its resolved bounds.
    pub fn table(&self) -> Result<Vec<(StyleConfig, DecodingParams)>> {
        let mut rows = Vec::with_capacity(Style::ALL.len() * Length::ALL.len());
        for style in Style::ALL {
            for length in Length::ALL {
                rows.push((StyleConfig::new(style, length), self.resolve(style, length)?));
            }
        }
        Ok(rows)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_ratio > 0.0 && self.min_ratio < 1.0) {
            return Err(Error::Configuration(format!(
                "min_ratio must be between 0 and 1, got {}",
                self.min_ratio
            )));
        }
        let rows = self.table()?;
        tracing::debug!("Decoding table validated ({} entries)", rows.len());
        Ok(())
    }
}

/// Fixed length band for the abstract generation stage, in words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbstractBand {
    pub min_words: u32,
    pub max_words: u32,
    pub beam_count: u32,
}

impl Default for AbstractBand {
    fn default() -> Self {
        Self {
            min_words: 100,
            max_words: 200,
            beam_count: 4,
        }
    }
}

impl AbstractBand {
    pub fn to_params(&self) -> Result<DecodingParams> {
        let band_error = |reason: String| Error::Configuration(format!("{} for the abstract band", reason));
        let (Some(min_tokens), Some(max_tokens)) =
            (words_to_tokens(self.min_words), words_to_tokens(self.max_words))
        else {
            return Err(band_error("word counts overflow the token range".to_string()));
        };
        let params = DecodingParams {
            min_tokens,
            max_tokens,
            beam_count: self.beam_count,
        };
        check_params(&params).map_err(band_error)?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        self.to_params().map(|_| ())
    }
}

impl DecodingParams {
    /// Approximate word bounds for prompts, rounding up.
    pub fn word_bounds(&self) -> (u32, u32) {
        (tokens_to_words(self.min_tokens), tokens_to_words(self.max_tokens))
    }
}

fn words_to_tokens(words: u32) -> Option<u32> {
    u32::try_from(u64::from(words) * u64::from(TOKENS_PER_WORD_NUM) / u64::from(TOKENS_PER_WORD_DEN))
        .ok()
}

// Fewer words than tokens, so the result always fits back into u32.
fn tokens_to_words(tokens: u32) -> u32 {
    let words = (u64::from(tokens) * u64::from(TOKENS_PER_WORD_DEN))
        .div_ceil(u64::from(TOKENS_PER_WORD_NUM));
    u32::try_from(words).unwrap_or(u32::MAX)
}

fn check_params(params: &DecodingParams) -> std::result::Result<(), String> {
    if params.min_tokens == 0 {
        return Err("min_tokens resolves to 0".to_string());
    }
    if params.min_tokens >= params.max_tokens {
        return Err(format!(
            "min_tokens ({}) is not below max_tokens ({})",
            params.min_tokens, params.max_tokens
        ));
    }
    if params.beam_count == 0 {
        return Err("beam_count must be positive".to_string());
    }
    Ok(())
}
