//! Parse LLM output into a structured result

use crate::error::ExtractorError;
use gleaner_domain::{Sentiment, StructuredResult};
use serde_json::{Map, Value};
use tracing::debug;

/// Parse an LLM JSON reply into a structured result
///
/// `summary` is mandatory. Optional fields may be absent or null, but a
/// field that is present with the wrong type rejects the whole reply.
pub fn parse_llm_response(response: &str) -> Result<StructuredResult, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)?;

    let obj = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON object".to_string()))?;

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .ok_or_else(|| ExtractorError::InvalidFormat("Missing or invalid 'summary'".to_string()))?
        .trim()
        .to_string();

    let title = match obj.get("title") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(_) => {
            return Err(ExtractorError::InvalidFormat(
                "'title' must be a string or null".to_string(),
            ))
        }
    };

    let sentiment = match obj.get("sentiment") {
        None | Some(Value::Null) => Sentiment::Neutral,
        Some(Value::String(label)) => Sentiment::parse(label).unwrap_or_else(|| {
            debug!("Unrecognised sentiment label '{}', using neutral", label);
            Sentiment::Neutral
        }),
        Some(_) => {
            return Err(ExtractorError::InvalidFormat(
                "'sentiment' must be a string".to_string(),
            ))
        }
    };

    Ok(StructuredResult {
        summary,
        title,
        topics: string_list(obj, "topics")?,
        sentiment,
        keywords: string_list(obj, "keywords")?,
    })
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if !trimmed.starts_with("```") {
        return Ok(trimmed);
    }

    // Drop the opening fence line (```json or ```) and the closing fence
    let body = trimmed
        .split_once('\n')
        .map(|(_, rest)| rest)
        .ok_or_else(|| ExtractorError::InvalidFormat("Empty code block".to_string()))?;
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);

    Ok(body.trim())
}

/// Optional array of strings; blank entries are dropped
fn string_list(obj: &Map<String, Value>, field: &str) -> Result<Vec<String>, ExtractorError> {
    let items = match obj.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ExtractorError::InvalidFormat(format!(
                "'{}' must be an array of strings",
                field
            )))
        }
    };

    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let s = item.as_str().ok_or_else(|| {
            ExtractorError::InvalidFormat(format!("'{}' must be an array of strings", field))
        })?;
        let s = s.trim();
        if !s.is_empty() {
            values.push(s.to_string());
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let response = r#"{
            "summary": "A bakery opened in Lisbon.",
            "title": "New Bakery",
            "topics": ["food", "business", "Lisbon"],
            "sentiment": "positive",
            "keywords": ["bakery", "bread", "opening"]
        }"#;

        let result = parse_llm_response(response).unwrap();
        assert_eq!(result.summary, "A bakery opened in Lisbon.");
        assert_eq!(result.title.as_deref(), Some("New Bakery"));
        assert_eq!(result.topics, vec!["food", "business", "Lisbon"]);
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.keywords, vec!["bakery", "bread", "opening"]);
    }

    #[test]
    fn test_parse_markdown_wrapped_json() {
        let response = "```json\n{\"summary\": \"Short.\", \"title\": null}\n```";
        let result = parse_llm_response(response).unwrap();
        assert_eq!(result.summary, "Short.");
        assert_eq!(result.title, None);
    }

    #[test]
    fn test_optional_fields_default() {
        let result = parse_llm_response(r#"{"summary": "Only a summary."}"#).unwrap();
        assert!(result.topics.is_empty());
        assert!(result.keywords.is_empty());
        assert_eq!(result.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_unrecognised_sentiment_is_neutral() {
        let result =
            parse_llm_response(r#"{"summary": "s", "sentiment": "Bittersweet"}"#).unwrap();
        assert_eq!(result.sentiment, Sentiment::Neutral);

        let result = parse_llm_response(r#"{"summary": "s", "sentiment": "NEGATIVE"}"#).unwrap();
        assert_eq!(result.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_blank_list_entries_dropped() {
        let result =
            parse_llm_response(r#"{"summary": "s", "keywords": ["  ", "rust", ""]}"#).unwrap();
        assert_eq!(result.keywords, vec!["rust"]);
    }

    #[test]
    fn test_missing_summary_rejected() {
        let result = parse_llm_response(r#"{"topics": ["a"]}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_wrong_types_rejected() {
        assert!(parse_llm_response(r#"{"summary": 42}"#).is_err());
        assert!(parse_llm_response(r#"{"summary": "s", "topics": "food"}"#).is_err());
        assert!(parse_llm_response(r#"{"summary": "s", "keywords": [1, 2]}"#).is_err());
        assert!(parse_llm_response(r#"{"summary": "s", "sentiment": 1}"#).is_err());
        assert!(parse_llm_response(r#"{"summary": "s", "title": ["t"]}"#).is_err());
    }

    #[test]
    fn test_not_json_or_not_object() {
        assert!(matches!(
            parse_llm_response("This is not JSON"),
            Err(ExtractorError::JsonParse(_))
        ));
        assert!(matches!(
            parse_llm_response("[1, 2, 3]"),
            Err(ExtractorError::InvalidFormat(_))
        ));
        assert!(parse_llm_response("```").is_err());
    }
}
