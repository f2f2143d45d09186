pub mod catalog;
pub mod error;
pub mod models;
pub mod params;
pub mod types;

pub use catalog::SAMPLE_TITLES;
pub use error::{Error, Result};
pub use models::{TextGenerator, TextSummarizer};
pub use params::{AbstractBand, DecodingTable};
pub use types::{
    DecodingParams, GenerationRequest, Length, PipelineResult, Stage, Style, StyleConfig,
    SummaryContext,
};
