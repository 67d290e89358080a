//! JSONPath evaluation over `serde_json::Value`.
//!
//! Queries are evaluated by `serde_json_path` (RFC 9535): member access,
//! indexes (negative counts from the end), wildcards, recursive descent,
//! slices `[start:end:step]`, unions `[0,2]` / `['a','b']` and filters such as
//! `[?(@.id == 2)]` or `[?@.tag]`. A leading `$` is implied when missing.
//!
//! A path without wildcards, recursive descent, slices, unions or filters is
//! definite and resolves to exactly one value. Any other path resolves to a
//! JSON array of every match.

use serde_json::Value;

use crate::error::ExtractError;

/// A parsed JSONPath expression.
#[derive(Debug, Clone)]
pub struct JsonPath {
    source: String,
    query: serde_json_path::JsonPath,
    definite: bool,
}

impl JsonPath {
    pub fn parse(expression: &str) -> Result<Self, ExtractError> {
        let invalid = |reason: String| ExtractError::InvalidPath {
            path: expression.to_string(),
            reason,
        };

        let trimmed = expression.trim();
        let normalized = if trimmed.is_empty() {
            return Err(invalid("empty expression".to_string()));
        } else if trimmed.starts_with('$') {
            trimmed.to_string()
        } else if trimmed.starts_with('[') {
            format!("${trimmed}")
        } else {
            format!("$.{trimmed}")
        };

        let query = serde_json_path::JsonPath::parse(&normalized)
            .map_err(|err| invalid(err.to_string()))?;
        Ok(Self {
            source: expression.to_string(),
            query,
            definite: is_definite(&normalized),
        })
    }

    /// True when the path names at most one location.
    pub fn is_definite(&self) -> bool {
        self.definite
    }

    /// Resolve the path against `root`.
    ///
    /// Definite paths return the single value found. Indefinite paths return
    /// an array of every match and fail only when nothing matched.
    pub fn resolve(&self, root: &Value) -> Result<Value, ExtractError> {
        let nodes = self.query.query(root).all();
        let not_found = || ExtractError::PathNotFound {
            path: self.source.clone(),
        };
        if nodes.is_empty() {
            Err(not_found())
        } else if self.definite {
            nodes.first().map(|v| (*v).clone()).ok_or_else(not_found)
        } else {
            Ok(Value::Array(nodes.into_iter().cloned().collect()))
        }
    }
}

/// Scan a normalized query for any segment that can select more than one
/// node. Quoted member names are skipped.
fn is_definite(query: &str) -> bool {
    let mut quote = None;
    let mut depth = 0usize;
    let mut prev = '\0';
    for c in query.chars() {
        match quote {
            Some(q) => {
                if c == q && prev != '\\' {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '*' | '?' => return false,
                '.' if prev == '.' => return false,
                ',' | ':' if depth > 0 => return false,
                _ => {}
            },
        }
        prev = if prev == '\\' && c == '\\' { '\0' } else { c };
    }
    true
}

/// Textual form of a resolved value as stored in a property.
///
/// Strings are stored without quotes, `null` as an empty string, everything
/// else as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
