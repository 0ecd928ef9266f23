/// Cap on how much of the document is embedded in the prompt. Longer input
/// is truncated, never expanded.
pub const MAX_PROMPT_DOC_CHARS: usize = 4000;

/// The exact JSON shape the model is asked to return. Embedded verbatim in
/// every analysis prompt; the normalization pass knows the same field set.
pub const ANALYSIS_RESPONSE_SCHEMA: &str = r#"{
  "extracted_data": {
    "document_type": "contract | invoice | act | application | other",
    "document_subtype": "free-form subtype or null",
    "parties": ["party 1", "party 2"],
    "total_amount": 100000.0,
    "currency": "RUB",
    "dates": {"signature": "2024-01-01", "deadline": "2024-12-31"},
    "financial_terms": {"payment_schedule": "...", "prepayment": "..."},
    "rental_terms": {"object": "...", "term": "...", "rent": "..."},
    "applicant_info": {"name": "...", "income": "...", "purpose": "..."},
    "items": [{"name": "...", "quantity": 1, "price": 0.0}],
    "obligations": ["obligation 1", "obligation 2"],
    "penalties": "penalty description or null",
    "requisites": {"inn": "...", "kpp": "...", "account": "..."}
  },
  "risk_flags": [
    {"level": "high | medium | low", "category": "financial", "description": "...", "suggestion": "..."}
  ],
  "action_items": ["action 1", "action 2"],
  "summary": "2-3 sentence summary of the document",
  "confidence_score": 0.85
}"#;

/// Build the analysis prompt for a document.
///
/// Pure and deterministic: the same text and schema always produce the same
/// prompt, which is what makes the content-addressed cache sound.
pub fn build_analysis_prompt(document_text: &str, schema: &str) -> String {
    let excerpt: String = document_text.chars().take(MAX_PROMPT_DOC_CHARS).collect();

    format!(
        r#"Analyze the document below and extract its contents as structured data.

<document>
{excerpt}
</document>

Return ONLY a JSON object with exactly this structure:

{schema}

Rules:
- Use null for any value that is not present in the document. Never invent values.
- Keep amounts, dates and names verbatim from the document.
- document_type must be one of: contract, invoice, act, application, other.
- Respond with the JSON object only, no prose before or after it.
"#
    )
}
