//! Turns a free-text model reply into a validated [`Quiz`].
//!
//! The reply may carry prose or code fences around the JSON. The first
//! balanced `{...}` block is parsed; it must be an object with a `quiz`
//! array, otherwise the whole reply is a parse error. Inside the array,
//! missing `mcq` / option texts fall back to empty strings (logged), while an
//! entry whose answer does not resolve to one of the labels `a`..`d` is
//! dropped so it can never reach the accepted quiz.

use crate::error::{Error, Result};
use crate::models::quiz::{OptionLabel, Question, QuestionOptions, Quiz};
use serde_json::{Map, Value as JsonValue};

pub fn parse_quiz(raw: &str) -> Result<Quiz> {
    let candidate = extract_json_object(raw)
        .ok_or_else(|| Error::malformed(raw, "reply contains no complete JSON object"))?;
    let value: JsonValue = serde_json::from_str(candidate).map_err(|e| Error::parse(raw, e))?;

    let entries = value
        .get("quiz")
        .and_then(|q| q.as_array())
        .ok_or_else(|| Error::malformed(raw, "reply has no `quiz` array"))?;

    let mut questions = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match coerce_question(idx, entry) {
            Ok(question) => questions.push(question),
            Err(reason) => tracing::warn!(index = idx, %reason, "dropping quiz entry"),
        }
    }

    Ok(Quiz::new(questions))
}

/// Returns the first brace-balanced substring, skipping braces inside JSON strings.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in raw[start..].char_indices() {
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
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

fn coerce_question(idx: usize, v: &JsonValue) -> std::result::Result<Question, String> {
    let obj = v
        .as_object()
        .ok_or_else(|| "entry is not an object".to_string())?;

    let mcq = match obj.get("mcq").and_then(scalar_text) {
        Some(text) => text,
        None => {
            tracing::warn!(index = idx, "quiz entry has no `mcq`, defaulting to empty string");
            String::new()
        }
    };

    let options = coerce_options(idx, obj.get("options"));

    let raw_answer = match obj.get("answer").and_then(scalar_text) {
        Some(answer) => answer,
        None => {
            tracing::warn!(index = idx, "quiz entry has no `answer`, defaulting to empty string");
            String::new()
        }
    };
    let answer = resolve_answer(&raw_answer, &options)
        .ok_or_else(|| format!("answer {:?} does not name one of the options a-d", raw_answer))?;

    Ok(Question {
        mcq,
        options,
        answer,
    })
}

fn coerce_options(idx: usize, v: Option<&JsonValue>) -> QuestionOptions {
    let mut options = QuestionOptions::default();
    let Some(map) = v.and_then(|o| o.as_object()) else {
        tracing::warn!(index = idx, "quiz entry has no `options` object, defaulting all options to empty strings");
        return options;
    };

    for label in OptionLabel::ALL {
        match option_text(map, label) {
            Some(text) => options.set(label, text),
            None => tracing::warn!(
                index = idx,
                option = %label,
                "quiz entry is missing an option, defaulting to empty string"
            ),
        }
    }

    options
}

fn option_text(map: &Map<String, JsonValue>, label: OptionLabel) -> Option<String> {
    let lower = label.as_str();
    let upper = lower.to_uppercase();
    map.get(lower)
        .or_else(|| map.get(upper.as_str()))
        .and_then(scalar_text)
}

fn scalar_text(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Maps `a`, `B`, `(c)`, `d)`, `a.`, `option b`, `a) Paris` or the full text
/// of one option to its label.
pub fn resolve_answer(raw: &str, options: &QuestionOptions) -> Option<OptionLabel> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }

    let lowered = cleaned.to_lowercase();
    let without_prefix = lowered
        .strip_prefix("option")
        .map(str::trim_start)
        .unwrap_or(&lowered);
    let bare = without_prefix.trim_matches(|c: char| matches!(c, '(' | ')' | '.' | ':') || c.is_whitespace());
    if let Some(label) = OptionLabel::parse(bare) {
        return Some(label);
    }

    if let Some((head, _)) = without_prefix.split_once(')') {
        if let Some(label) = OptionLabel::parse(head.trim_start_matches('(')) {
            return Some(label);
        }
    }

    options
        .iter()
        .find(|(_, text)| !text.trim().is_empty() && text.trim().to_lowercase() == lowered)
        .map(|(label, _)| label)
}
