use std::sync::Arc;

use super::cache::{fingerprint, CacheStats, ResultCache, DEFAULT_CACHE_CAPACITY};
use super::normalize::normalize_payload;
use super::parser::extract_json_object;
use super::prompt::{build_analysis_prompt, ANALYSIS_RESPONSE_SCHEMA};
use super::types::AnalysisResult;
use super::AnalysisError;
use crate::gpt::CompletionClient;

/// Minimum input length for analysis (trimmed characters).
pub const MIN_INPUT_LENGTH: usize = 10;

/// Token budget used when the caller has no opinion. One collapsed prompt
/// covers extraction, risks, action items and summary in a single
/// completion.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Where a returned result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    Cache,
    Model,
}

/// One finished analysis: the shared result plus its provenance.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: Arc<AnalysisResult>,
    pub source: AnalysisSource,
}

/// Orchestrates the full document analysis pipeline:
/// fingerprint → cache → prompt → completion → parse → normalize → store.
pub struct DocumentAnalyzer {
    llm: Box<dyn CompletionClient + Send + Sync>,
    cache: ResultCache,
}

impl DocumentAnalyzer {
    pub fn new(llm: Box<dyn CompletionClient + Send + Sync>) -> Self {
        Self::with_cache_capacity(llm, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(
        llm: Box<dyn CompletionClient + Send + Sync>,
        capacity: usize,
    ) -> Self {
        Self {
            llm,
            cache: ResultCache::new(capacity),
        }
    }

    /// Analyze one document text.
    ///
    /// A known fingerprint returns the cached result without touching the
    /// model. Otherwise this performs exactly one completion round trip;
    /// credential and transport failures propagate unchanged and leave the
    /// cache unwritten. A response that is not parseable JSON is NOT a
    /// failure — it produces the fixed low-confidence fallback result,
    /// which is cached like any other.
    pub fn analyze(
        &self,
        text: &str,
        max_tokens: u32,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        if text.trim().chars().count() < MIN_INPUT_LENGTH {
            return Err(AnalysisError::InputTooShort);
        }

        let fp = fingerprint(text);
        let _span = tracing::info_span!("analyze_document", fingerprint = %fp).entered();

        if let Some(result) = self.cache.get(&fp) {
            tracing::debug!("fingerprint already analyzed, serving cached result");
            return Ok(AnalysisOutcome {
                result,
                source: AnalysisSource::Cache,
            });
        }

        let prompt = build_analysis_prompt(text, ANALYSIS_RESPONSE_SCHEMA);
        let raw = self.llm.complete(&prompt, max_tokens)?;

        let result = match extract_json_object(&raw) {
            Some(payload) => normalize_payload(&payload),
            None => {
                tracing::warn!(
                    response_len = raw.len(),
                    "model response is not parseable JSON, using fallback result"
                );
                AnalysisResult::fallback()
            }
        };

        let result = self.cache.put(&fp, result);
        Ok(AnalysisOutcome {
            result,
            source: AnalysisSource::Model,
        })
    }

    /// Read-only cache counters for operational inspection.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpt::MockCompletionClient;
    use crate::pipeline::cache::FINGERPRINT_PREFIX_CHARS;
    use crate::pipeline::types::DocumentType;

    const CONTRACT_TEXT: &str =
        "Договор №1 между ООО Ромашка и ИП Ивановым, сумма 100000 руб, срок до 31.12.2024";

    const CONTRACT_RESPONSE: &str = r#"{"extracted_data":{"document_type":"contract","total_amount":100000,"currency":"RUB"},"risk_flags":[],"action_items":["sign"],"summary":"ok","confidence_score":0.9}"#;

    fn analyzer_with(mock: &Arc<MockCompletionClient>) -> DocumentAnalyzer {
        DocumentAnalyzer::new(Box::new(Arc::clone(mock)))
    }

    #[test]
    fn analyzed_document_matches_model_payload() {
        let mock = Arc::new(MockCompletionClient::new(CONTRACT_RESPONSE));
        let analyzer = analyzer_with(&mock);

        let outcome = analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();

        assert_eq!(outcome.source, AnalysisSource::Model);
        let data = &outcome.result.extracted_data;
        assert_eq!(data.document_type, DocumentType::Contract);
        assert_eq!(data.total_amount, Some(100000.0));
        assert_eq!(data.currency, "RUB");
        assert_eq!(outcome.result.action_items, vec!["sign"]);
        assert_eq!(outcome.result.summary, "ok");
        assert!((outcome.result.confidence_score - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn unparseable_response_yields_exact_fallback() {
        let mock = Arc::new(MockCompletionClient::new("not json at all"));
        let analyzer = analyzer_with(&mock);

        let outcome = analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();

        assert_eq!(outcome.source, AnalysisSource::Model);
        assert_eq!(*outcome.result, AnalysisResult::fallback());
    }

    #[test]
    fn second_analysis_served_from_cache_without_model_call() {
        let mock = Arc::new(MockCompletionClient::new(CONTRACT_RESPONSE));
        let analyzer = analyzer_with(&mock);

        let first = analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();
        let second = analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();

        assert_eq!(first.source, AnalysisSource::Model);
        assert_eq!(second.source, AnalysisSource::Cache);
        assert!(Arc::ptr_eq(&first.result, &second.result));
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn same_prefix_different_tail_hits_cache() {
        let mock = Arc::new(MockCompletionClient::new(CONTRACT_RESPONSE));
        let analyzer = analyzer_with(&mock);

        let base = "у".repeat(FINGERPRINT_PREFIX_CHARS);
        let one = format!("{base} типовой хвост");
        let two = format!("{base} другой шаблонный хвост");

        analyzer.analyze(&one, DEFAULT_MAX_TOKENS).unwrap();
        let outcome = analyzer.analyze(&two, DEFAULT_MAX_TOKENS).unwrap();

        assert_eq!(outcome.source, AnalysisSource::Cache);
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn transport_failure_propagates_and_skips_cache() {
        let mock = Arc::new(MockCompletionClient::failing(503, "upstream down"));
        let analyzer = analyzer_with(&mock);

        let err = analyzer
            .analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS)
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Transport(_)));
        assert_eq!(analyzer.cache_stats().size, 0);
    }

    #[test]
    fn failed_request_leaves_cache_usable_for_retry() {
        let failing = Arc::new(MockCompletionClient::failing(500, "boom"));
        let analyzer = analyzer_with(&failing);
        assert!(analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).is_err());

        // A fresh analyzer over the same cache-less state still works; the
        // failed attempt must not have poisoned anything.
        let ok = Arc::new(MockCompletionClient::new(CONTRACT_RESPONSE));
        let analyzer = analyzer_with(&ok);
        let outcome = analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();
        assert_eq!(outcome.source, AnalysisSource::Model);
    }

    #[test]
    fn short_input_rejected_before_model_call() {
        let mock = Arc::new(MockCompletionClient::new(CONTRACT_RESPONSE));
        let analyzer = analyzer_with(&mock);

        let err = analyzer.analyze("   短い   ", DEFAULT_MAX_TOKENS).unwrap_err();

        assert!(matches!(err, AnalysisError::InputTooShort));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn cache_stats_expose_hits_and_misses() {
        let mock = Arc::new(MockCompletionClient::new(CONTRACT_RESPONSE));
        let analyzer = analyzer_with(&mock);

        analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();
        analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();

        let stats = analyzer.cache_stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn fallback_results_are_cached_too() {
        let mock = Arc::new(MockCompletionClient::new("ничего похожего на JSON"));
        let analyzer = analyzer_with(&mock);

        analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();
        let second = analyzer.analyze(CONTRACT_TEXT, DEFAULT_MAX_TOKENS).unwrap();

        assert_eq!(second.source, AnalysisSource::Cache);
        assert_eq!(*second.result, AnalysisResult::fallback());
        assert_eq!(mock.calls(), 1);
    }
}
