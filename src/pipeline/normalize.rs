use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::types::{
    AnalysisResult, DocumentType, ExtractedData, RiskFlag, RiskLevel, DEFAULT_CONFIDENCE,
    FALLBACK_ACTION_ITEM, UNSPECIFIED_CURRENCY,
};

/// Coerce a parsed model payload into the canonical result shape.
///
/// Never fails. Each field has exactly one default, applied uniformly
/// whether the payload came from a clean parse or a sloppy one — a valid
/// JSON object carries no guarantee of field-level validity.
pub fn normalize_payload(payload: &Map<String, Value>) -> AnalysisResult {
    let extracted_data = normalize_extracted(
        payload.get("extracted_data").and_then(Value::as_object),
    );

    let risk_flags = payload
        .get("risk_flags")
        .and_then(Value::as_array)
        .map(|flags| flags.iter().filter_map(normalize_risk_flag).collect())
        .unwrap_or_default();

    let mut action_items = string_list(payload.get("action_items"));
    if action_items.is_empty() {
        action_items.push(FALLBACK_ACTION_ITEM.to_string());
    }

    let summary = payload
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let confidence_score = payload
        .get("confidence_score")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    AnalysisResult {
        extracted_data,
        risk_flags,
        action_items,
        summary,
        confidence_score,
    }
}

fn normalize_extracted(obj: Option<&Map<String, Value>>) -> ExtractedData {
    let Some(obj) = obj else {
        return ExtractedData::default();
    };

    ExtractedData {
        document_type: obj
            .get("document_type")
            .and_then(Value::as_str)
            .map(DocumentType::parse)
            .unwrap_or(DocumentType::Other),
        document_subtype: non_empty_string(obj.get("document_subtype")),
        parties: string_list(obj.get("parties")),
        total_amount: obj.get("total_amount").and_then(Value::as_f64),
        currency: non_empty_string(obj.get("currency"))
            .unwrap_or_else(|| UNSPECIFIED_CURRENCY.to_string()),
        dates: date_map(obj.get("dates")),
        financial_terms: raw_object(obj.get("financial_terms")),
        rental_terms: raw_object(obj.get("rental_terms")),
        applicant_info: raw_object(obj.get("applicant_info")),
        items: obj
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        obligations: string_list(obj.get("obligations")),
        penalties: non_empty_string(obj.get("penalties")),
        requisites: raw_object(obj.get("requisites")),
    }
}

/// Lenient per-entry coercion: non-object entries are dropped, missing
/// fields get their documented defaults.
fn normalize_risk_flag(value: &Value) -> Option<RiskFlag> {
    let obj = value.as_object()?;
    Some(RiskFlag {
        level: obj
            .get("level")
            .and_then(Value::as_str)
            .map(RiskLevel::parse)
            .unwrap_or(RiskLevel::Low),
        category: obj
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or("other")
            .to_string(),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        suggestion: obj
            .get("suggestion")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Missing or null → empty; a bare scalar → one-element list; string
/// elements kept verbatim, other scalars stringified, nulls and nested
/// containers dropped.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other).map(|s| vec![s]).unwrap_or_default(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Label → optional date string. Anything other than an object becomes an
/// empty map; non-string date values become explicit `None`.
fn date_map(value: Option<&Value>) -> BTreeMap<String, Option<String>> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };
    map.iter()
        .map(|(label, v)| (label.clone(), v.as_str().map(str::to_string)))
        .collect()
}

/// Supplemental sections are kept as raw JSON, but only when they actually
/// are objects.
fn raw_object(value: Option<&Value>) -> Option<Value> {
    match value {
        Some(Value::Object(_)) => value.cloned(),
        _ => None,
    }
}
