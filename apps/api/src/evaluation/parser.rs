//! Response Parser — turns raw model text into an `EvaluationResult`.
//!
//! The parser never substitutes the sentinel itself: it returns a typed
//! `ParseError` and `ResultRow::from_outcome` decides what goes in the table.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const SENTINEL_MATCH: &str = "Error";
pub const SENTINEL_PARSE_SUMMARY: &str = "Error parsing response";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response JSON is not an object")]
    NotAnObject,
}

/// The three fields the ATS prompt asks for. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(rename = "JD Match", default, deserialize_with = "deserialize_match")]
    pub match_percent: Option<String>,

    /// `Some(vec![])` = the model reported nothing missing; `None` = key absent.
    #[serde(
        rename = "MissingKeywords",
        default,
        deserialize_with = "deserialize_keywords"
    )]
    pub missing_keywords: Option<Vec<String>>,

    #[serde(
        rename = "Profile Summary",
        default,
        deserialize_with = "deserialize_summary"
    )]
    pub profile_summary: Option<String>,
}

impl EvaluationResult {
    /// The fixed record used when a response cannot be parsed.
    pub fn sentinel() -> Self {
        Self {
            match_percent: Some(SENTINEL_MATCH.to_string()),
            missing_keywords: Some(Vec::new()),
            profile_summary: Some(SENTINEL_PARSE_SUMMARY.to_string()),
        }
    }

    /// True when all three keys were present in the response.
    pub fn is_complete(&self) -> bool {
        self.match_percent.is_some()
            && self.missing_keywords.is_some()
            && self.profile_summary.is_some()
    }
}

/// Strips fence markers and whitespace, then parses the remainder.
pub fn parse_response(raw: &str) -> Result<EvaluationResult, ParseError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned)?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

/// Removes every ```` ```json ```` and ```` ``` ```` marker, wherever it appears.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn deserialize_match<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(format!("{n}%")),
        Some(other) => Some(other.to_string()),
    })
}

fn deserialize_summary<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        // a list of sentences reads as one paragraph
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Some(other) => Some(other.to_string()),
    })
}

fn deserialize_keywords<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Some(Value::String(s)) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        ),
        Some(other) => Some(vec![other.to_string()]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "Experienced backend engineer, missing database-specific keyword.";

    #[test]
    fn test_fenced_response_is_parsed() {
        let raw = format!(
            "```json\n{{\"JD Match\": \"62%\", \"MissingKeywords\": [\"PostgreSQL\"], \"Profile Summary\": \"{SUMMARY}\"}}\n```"
        );
        let result = parse_response(&raw).unwrap();
        assert_eq!(result.match_percent.as_deref(), Some("62%"));
        assert_eq!(result.missing_keywords, Some(vec!["PostgreSQL".to_string()]));
        assert_eq!(result.profile_summary.as_deref(), Some(SUMMARY));
        assert!(result.is_complete());
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
        assert_eq!(strip_code_fences("Here you go: ```json {} ``` thanks"), "Here you go:  {}  thanks");
    }

    #[test]
    fn test_prose_around_json_is_a_parse_error() {
        let err = parse_response("Sure! ```json {\"JD Match\": \"10%\"} ```").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        assert!(matches!(parse_response("[1, 2]"), Err(ParseError::NotAnObject)));
        assert!(matches!(parse_response("\"62%\""), Err(ParseError::NotAnObject)));
    }

    #[test]
    fn test_missing_key_defaults_only_that_key() {
        let result = parse_response(r#"{"JD Match": "80%", "Profile Summary": "Solid"}"#).unwrap();
        assert_eq!(result.match_percent.as_deref(), Some("80%"));
        assert_eq!(result.missing_keywords, None);
        assert_eq!(result.profile_summary.as_deref(), Some("Solid"));
        assert!(!result.is_complete());
    }

    #[test]
    fn test_empty_keyword_list_is_distinct_from_absent() {
        let result = parse_response(
            r#"{"JD Match": "95%", "MissingKeywords": [], "Profile Summary": "Great"}"#,
        )
        .unwrap();
        assert_eq!(result.missing_keywords, Some(vec![]));
        assert!(result.is_complete());
    }

    #[test]
    fn test_numeric_match_gets_percent_sign() {
        let result = parse_response(r#"{"JD Match": 75}"#).unwrap();
        assert_eq!(result.match_percent.as_deref(), Some("75%"));
    }

    #[test]
    fn test_keywords_as_comma_separated_string() {
        let result = parse_response(r#"{"MissingKeywords": "Kafka, Terraform ,"}"#).unwrap();
        assert_eq!(
            result.missing_keywords,
            Some(vec!["Kafka".to_string(), "Terraform".to_string()])
        );
    }

    #[test]
    fn test_non_string_summary_keeps_the_other_fields() {
        let result = parse_response(
            r#"{"JD Match": "62%", "MissingKeywords": ["PostgreSQL"], "Profile Summary": ["Backend", "Go"]}"#,
        )
        .unwrap();
        assert_eq!(result.match_percent.as_deref(), Some("62%"));
        assert_eq!(result.missing_keywords, Some(vec!["PostgreSQL".to_string()]));
        assert_eq!(result.profile_summary.as_deref(), Some("Backend Go"));

        let result = parse_response(r#"{"JD Match": "10%", "Profile Summary": 5}"#).unwrap();
        assert_eq!(result.profile_summary.as_deref(), Some("5"));
    }

    #[test]
    fn test_null_fields_are_absent() {
        let result =
            parse_response(r#"{"JD Match": null, "MissingKeywords": null, "Profile Summary": null}"#)
                .unwrap();
        assert_eq!(result, EvaluationResult::default());
    }

    #[test]
    fn test_sentinel_values() {
        let sentinel = EvaluationResult::sentinel();
        assert_eq!(sentinel.match_percent.as_deref(), Some("Error"));
        assert_eq!(sentinel.missing_keywords, Some(vec![]));
        assert_eq!(sentinel.profile_summary.as_deref(), Some("Error parsing response"));
    }
}
