use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default confidence when the model omits the score.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Confidence assigned to the fixed fallback result.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Action item supplied when the model returns none, and the single item of
/// the fallback result.
pub const FALLBACK_ACTION_ITEM: &str = "review document manually";

/// Summary of the fallback result.
pub const FALLBACK_SUMMARY: &str = "could not analyze document";

/// Currency placeholder when the document names none.
pub const UNSPECIFIED_CURRENCY: &str = "not specified";

/// Document classification. Anything the model returns outside this set is
/// coerced to `Other`, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Contract,
    Invoice,
    Act,
    Application,
    Other,
}

impl DocumentType {
    /// Map a model-supplied type string onto the enum. Handles the English
    /// schema terms and common Russian document names; everything else is
    /// `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().trim() {
            "contract" | "договор" | "контракт" => Self::Contract,
            "invoice" | "счет" | "счёт" | "счет-фактура" | "счёт-фактура" => {
                Self::Invoice
            }
            "act" | "акт" => Self::Act,
            "application" | "заявка" | "заявление" => Self::Application,
            _ => Self::Other,
        }
    }
}

/// Risk severity. Unrecognized levels are coerced to `Low`, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().trim() {
            "medium" | "средний" => Self::Medium,
            "high" | "высокий" => Self::High,
            _ => Self::Low,
        }
    }
}

/// One risk the model flagged, in the order the model returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub level: RiskLevel,
    pub category: String,
    pub description: String,
    pub suggestion: String,
}

/// Structured fields extracted from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub document_type: DocumentType,
    pub document_subtype: Option<String>,
    pub parties: Vec<String>,
    pub total_amount: Option<f64>,
    pub currency: String,
    pub dates: BTreeMap<String, Option<String>>,
    pub financial_terms: Option<Value>,
    pub rental_terms: Option<Value>,
    pub applicant_info: Option<Value>,
    pub items: Vec<Value>,
    pub obligations: Vec<String>,
    pub penalties: Option<String>,
    pub requisites: Option<Value>,
}

impl Default for ExtractedData {
    fn default() -> Self {
        Self {
            document_type: DocumentType::Other,
            document_subtype: None,
            parties: Vec::new(),
            total_amount: None,
            currency: UNSPECIFIED_CURRENCY.to_string(),
            dates: BTreeMap::new(),
            financial_terms: None,
            rental_terms: None,
            applicant_info: None,
            items: Vec::new(),
            obligations: Vec::new(),
            penalties: None,
            requisites: None,
        }
    }
}

/// Canonical result of one analysis. Constructed once, immutable
/// thereafter — the cache and the caller share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub extracted_data: ExtractedData,
    pub risk_flags: Vec<RiskFlag>,
    pub action_items: Vec<String>,
    pub summary: String,
    pub confidence_score: f64,
}

impl AnalysisResult {
    /// The fixed low-confidence result used when model output cannot be
    /// parsed as JSON at all.
    pub fn fallback() -> Self {
        Self {
            extracted_data: ExtractedData::default(),
            risk_flags: Vec::new(),
            action_items: vec![FALLBACK_ACTION_ITEM.to_string()],
            summary: FALLBACK_SUMMARY.to_string(),
            confidence_score: FALLBACK_CONFIDENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_parses_schema_terms() {
        assert_eq!(DocumentType::parse("contract"), DocumentType::Contract);
        assert_eq!(DocumentType::parse("INVOICE"), DocumentType::Invoice);
        assert_eq!(DocumentType::parse(" act "), DocumentType::Act);
        assert_eq!(DocumentType::parse("application"), DocumentType::Application);
    }

    #[test]
    fn document_type_parses_russian_names() {
        assert_eq!(DocumentType::parse("Договор"), DocumentType::Contract);
        assert_eq!(DocumentType::parse("счёт"), DocumentType::Invoice);
        assert_eq!(DocumentType::parse("акт"), DocumentType::Act);
        assert_eq!(DocumentType::parse("заявление"), DocumentType::Application);
    }

    #[test]
    fn unknown_document_type_coerced_to_other() {
        assert_eq!(DocumentType::parse("receipt"), DocumentType::Other);
        assert_eq!(DocumentType::parse(""), DocumentType::Other);
        assert_eq!(DocumentType::parse("contract agreement"), DocumentType::Other);
    }

    #[test]
    fn unknown_risk_level_coerced_to_low() {
        assert_eq!(RiskLevel::parse("high"), RiskLevel::High);
        assert_eq!(RiskLevel::parse("Medium"), RiskLevel::Medium);
        assert_eq!(RiskLevel::parse("critical"), RiskLevel::Low);
        assert_eq!(RiskLevel::parse(""), RiskLevel::Low);
    }

    #[test]
    fn document_type_serializes_lowercase() {
        let json = serde_json::to_string(&DocumentType::Contract).unwrap();
        assert_eq!(json, "\"contract\"");
    }

    #[test]
    fn fallback_result_shape() {
        let result = AnalysisResult::fallback();
        assert_eq!(result.extracted_data.document_type, DocumentType::Other);
        assert_eq!(result.extracted_data.currency, UNSPECIFIED_CURRENCY);
        assert!(result.extracted_data.parties.is_empty());
        assert!(result.extracted_data.total_amount.is_none());
        assert!(result.risk_flags.is_empty());
        assert_eq!(result.action_items, vec![FALLBACK_ACTION_ITEM]);
        assert_eq!(result.summary, FALLBACK_SUMMARY);
        assert!((result.confidence_score - FALLBACK_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn result_round_trips_through_json() {
        let result = AnalysisResult::fallback();
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
