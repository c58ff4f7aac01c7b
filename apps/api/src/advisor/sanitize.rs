//! Turns raw model text into a `RecommendationResult`.
//!
//! Models wrap JSON in code fences, prefix it with "JSON:", or surround it
//! with prose. Valid JSON is parsed directly. Anything else has the wrapping
//! stripped and the first balanced top-level object taken, and then the full
//! structure must parse. There is no partial acceptance.

use serde_json::Value;
use thiserror::Error;

use crate::models::recommendation::RecommendationResult;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing string field 'overall_advice'")]
    MissingAdvice,

    #[error("missing array field 'recommendations'")]
    MissingRecommendations,

    #[error("'recommendations' is empty")]
    EmptyRecommendations,

    #[error("recommendation {index} is malformed: {source}")]
    MalformedRecommendation {
        index: usize,
        source: serde_json::Error,
    },
}

/// Label prefixes models sometimes put before the object.
const LABEL_PREFIXES: &[&str] = &["json:", "json"];

/// Removes fence delimiters and a leading label, then cuts out the first
/// top-level `{...}` object. Returns the cleaned text unchanged when it
/// contains no `{` at all, so the parse step reports the real problem.
pub fn sanitize_payload(text: &str) -> &str {
    let text = strip_fences(text);
    let text = strip_label(text);
    extract_first_object(text).unwrap_or(text)
}

/// Parses model output. Text that is already valid JSON is taken as-is;
/// only text that fails to parse goes through `sanitize_payload`.
pub fn parse_recommendations(text: &str) -> Result<RecommendationResult, FormatError> {
    let value: Value = match serde_json::from_str(text.trim()) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(sanitize_payload(text))?,
    };

    let object = value.as_object().ok_or(FormatError::NotAnObject)?;

    let overall_advice = object
        .get("overall_advice")
        .and_then(Value::as_str)
        .ok_or(FormatError::MissingAdvice)?
        .to_string();

    let items = object
        .get("recommendations")
        .and_then(Value::as_array)
        .ok_or(FormatError::MissingRecommendations)?;

    if items.is_empty() {
        return Err(FormatError::EmptyRecommendations);
    }

    let recommendations = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item.clone())
                .map_err(|source| FormatError::MalformedRecommendation { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecommendationResult {
        overall_advice,
        recommendations,
    })
}

/// Strips ```json ... ``` or ``` ... ``` fences, including fences that sit
/// in the middle of surrounding prose.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find("```") else {
        return text;
    };

    let after_open = &text[open + 3..];
    // Skip an info string such as `json` up to the end of the fence line.
    let body_start = after_open
        .find('\n')
        .filter(|&nl| {
            after_open[..nl]
                .trim()
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        })
        .map(|nl| nl + 1)
        .unwrap_or_else(|| {
            after_open
                .strip_prefix("json")
                .map(|_| 4)
                .unwrap_or(0)
        });
    let body = &after_open[body_start..];

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

fn strip_label(text: &str) -> &str {
    let trimmed = text.trim_start();
    for prefix in LABEL_PREFIXES {
        if let Some(head) = trimmed.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                let rest = trimmed[prefix.len()..].trim_start();
                if rest.starts_with('{') || prefix.ends_with(':') {
                    return rest;
                }
            }
        }
    }
    trimmed
}

/// Returns the first balanced `{...}` in `text`, honouring string literals
/// and escapes. An unbalanced object yields everything from its opening
/// brace, which then fails to parse.
fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Some(&text[start..])
}
