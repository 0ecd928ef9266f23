//! Document analysis pipeline for contract-like documents.
//!
//! Raw extracted document text goes in; a structured [`AnalysisResult`]
//! (extracted fields, risk flags, action items, summary, confidence score)
//! comes out. Reasoning is delegated to the YandexGPT completion endpoint
//! behind a cached IAM bearer token; a content-addressed result cache
//! avoids re-invoking the model for previously seen input.

pub mod config;
pub mod gpt;
pub mod pipeline;

pub use config::GptConfig;
pub use gpt::{IamTokenManager, YandexGptClient};
pub use pipeline::{
    AnalysisError, AnalysisOutcome, AnalysisResult, AnalysisSource, DocumentAnalyzer,
};
