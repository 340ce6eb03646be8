//! Key-casing conventions for JSON bodies.
//!
//! # Design
//! Rust structs are snake_case, most JSON APIs are camelCase, some are
//! kebab-case. Rather than sprinkling `#[serde(rename_all)]` on every DTO,
//! bodies are rewritten as `serde_json::Value` trees on the way out and on
//! the way in. Only object keys change; string values are never touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HttpError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyCase {
    #[default]
    Preserve,
    Camel,
    Pascal,
    Snake,
    Kebab,
    ScreamingSnake,
}

impl KeyCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCase::Preserve => "preserve",
            KeyCase::Camel => "camel",
            KeyCase::Pascal => "pascal",
            KeyCase::Snake => "snake",
            KeyCase::Kebab => "kebab",
            KeyCase::ScreamingSnake => "screaming-snake",
        }
    }
}

impl fmt::Display for KeyCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyCase {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "preserve" | "none" => Ok(KeyCase::Preserve),
            "camel" => Ok(KeyCase::Camel),
            "pascal" => Ok(KeyCase::Pascal),
            "snake" => Ok(KeyCase::Snake),
            "kebab" => Ok(KeyCase::Kebab),
            "screaming-snake" => Ok(KeyCase::ScreamingSnake),
            other => Err(HttpError::Config(format!("unknown key case: {other}"))),
        }
    }
}

/// Rename a single key into `case`.
pub fn convert_key(key: &str, case: KeyCase) -> String {
    if case == KeyCase::Preserve || !key.chars().any(char::is_alphabetic) {
        return key.to_string();
    }

    let prefix_len = key.len() - key.trim_start_matches('_').len();
    let (prefix, rest) = key.split_at(prefix_len);
    let words = split_words(rest);

    let mut out = String::with_capacity(key.len() + words.len());
    out.push_str(prefix);
    match case {
        KeyCase::Preserve => out.push_str(rest),
        KeyCase::Snake => out.push_str(&join_lower(&words, "_")),
        KeyCase::Kebab => out.push_str(&join_lower(&words, "-")),
        KeyCase::ScreamingSnake => out.push_str(&join_lower(&words, "_").to_uppercase()),
        KeyCase::Camel => {
            for (i, word) in words.iter().enumerate() {
                if i == 0 {
                    out.push_str(&word.to_lowercase());
                } else {
                    out.push_str(&capitalize(word));
                }
            }
        }
        KeyCase::Pascal => {
            for word in &words {
                out.push_str(&capitalize(word));
            }
        }
    }
    out
}

/// Recursively rename every object key in `value`.
///
/// Keys that collapse to the same name (`userId` and `user_id` under
/// snake case) keep whichever comes last in the object's iteration order;
/// each collision is logged at DEBUG on `courier::casing`.
pub fn transform_keys(value: Value, case: KeyCase) -> Value {
    if case == KeyCase::Preserve {
        return value;
    }
    match value {
        Value::Object(map) => {
            let mut renamed = Map::with_capacity(map.len());
            for (key, value) in map {
                let converted = convert_key(&key, case);
                let value = transform_keys(value, case);
                if renamed.insert(converted.clone(), value).is_some() {
                    tracing::debug!(
                        target: "courier::casing",
                        key = key.as_str(),
                        renamed = converted.as_str(),
                        case = %case,
                        "key collision, earlier value replaced"
                    );
                }
            }
            Value::Object(renamed)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| transform_keys(item, case))
                .collect(),
        ),
        other => other,
    }
}

fn split_words(key: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = key.char_indices().collect();
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | ' ' | '.') {
            if let Some(s) = start.take() {
                words.push(&key[s..pos]);
            }
            continue;
        }
        if let Some(s) = start {
            if c.is_uppercase() {
                let prev = chars[i - 1].1;
                let next_is_lower = chars.get(i + 1).is_some_and(|&(_, n)| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary {
                    words.push(&key[s..pos]);
                    start = Some(pos);
                }
            }
        } else {
            start = Some(pos);
        }
    }
    if let Some(s) = start {
        words.push(&key[s..]);
    }
    words
}

fn join_lower(words: &[&str], sep: &str) -> String {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(sep)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
