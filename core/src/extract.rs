//! Value extraction from response bodies into the property store.
//!
//! # Design
//! Four rule shapes can be configured at once, but only one is ever
//! evaluated, chosen by fixed precedence:
//! multi-rule JSONPath, then single JSONPath, then multi-rule regex, then
//! single regex. `ExtractionRules::resolve` applies that precedence up front
//! so evaluation only ever sees one shape.
//!
//! Rules in a multi-rule set are independent: each one writes its own
//! property, and a rule that fails or finds nothing is logged and skipped
//! without affecting the others.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::HttpCallConfig;
use crate::error::ExtractError;
use crate::jsonpath::{self, JsonPath};
use crate::store::PropertyStore;

/// The single rule shape selected for an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtractionRules {
    /// Output property name to JSONPath expression.
    JsonPaths(BTreeMap<String, String>),
    JsonPath {
        expression: String,
        property: String,
    },
    /// Output property name to regular expression.
    Patterns(BTreeMap<String, String>),
    Pattern {
        pattern: String,
        property: String,
    },
    #[default]
    None,
}

impl ExtractionRules {
    /// Pick the highest-precedence rule shape present in `config`.
    pub fn resolve(config: &HttpCallConfig) -> Self {
        if !config.json_paths.is_empty() {
            ExtractionRules::JsonPaths(config.json_paths.clone())
        } else if let Some(expression) = &config.json_path {
            ExtractionRules::JsonPath {
                expression: expression.clone(),
                property: config.output_property.clone(),
            }
        } else if !config.extract_patterns.is_empty() {
            ExtractionRules::Patterns(config.extract_patterns.clone())
        } else if let Some(pattern) = &config.extract_pattern {
            ExtractionRules::Pattern {
                pattern: pattern.clone(),
                property: config.output_property.clone(),
            }
        } else {
            ExtractionRules::None
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ExtractionRules::None)
    }

    /// Evaluate every rule against `body`, returning the properties written.
    pub fn apply(&self, body: &str, store: &mut dyn PropertyStore) -> Vec<String> {
        let mut written = Vec::new();
        match self {
            ExtractionRules::JsonPaths(rules) => {
                for (property, expression) in rules {
                    let result = extract_json(body, expression, property, store);
                    record(result, property, &mut written);
                }
            }
            ExtractionRules::JsonPath {
                expression,
                property,
            } => {
                let result = extract_json(body, expression, property, store);
                record(result, property, &mut written);
            }
            ExtractionRules::Patterns(rules) => {
                for (property, pattern) in rules {
                    let result = extract_regex(body, pattern, property, store);
                    record(result, property, &mut written);
                }
            }
            ExtractionRules::Pattern { pattern, property } => {
                let result = extract_regex(body, pattern, property, store);
                record(result, property, &mut written);
            }
            ExtractionRules::None => {}
        }
        written
    }
}

fn record(result: Result<String, ExtractError>, property: &str, written: &mut Vec<String>) {
    match result {
        Ok(value) => {
            info!("Set property {property} = {value}");
            written.push(property.to_string());
        }
        Err(err) if err.is_not_found() => warn!("{err}"),
        Err(err) => error!("Failed to extract value for property '{property}': {err}"),
    }
}

/// Resolve `expression` against `body` parsed as JSON and store the result
/// under `property`. Returns the stored text.
pub fn extract_json(
    body: &str,
    expression: &str,
    property: &str,
    store: &mut dyn PropertyStore,
) -> Result<String, ExtractError> {
    let path = JsonPath::parse(expression)?;
    let document: Value = serde_json::from_str(body)?;
    let value = jsonpath::render(&path.resolve(&document)?);
    store.set(property, value.clone());
    Ok(value)
}

/// Search `text` for the first match of `pattern` and store it under
/// `property`: the first capture group when the pattern has one, otherwise
/// the whole match. Returns the stored text.
pub fn extract_regex(
    text: &str,
    pattern: &str,
    property: &str,
    store: &mut dyn PropertyStore,
) -> Result<String, ExtractError> {
    let regex = Regex::new(pattern)?;
    let group = if regex.captures_len() > 1 { 1 } else { 0 };
    let value = regex
        .captures(text)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractError::NoMatch {
            pattern: pattern.to_string(),
        })?;
    store.set(property, value.clone());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const JSON_BODY: &str =
        r#"{"name":"test","version":"1.0","nested":{"value":"nested-data"},"build":7,"ok":true}"#;
    const HTML_BODY: &str = "<title>Test Page</title><h1>Welcome</h1>";

    fn store() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn json_rules_set_every_resolved_property() {
        let rules = ExtractionRules::JsonPaths(BTreeMap::from([
            ("app.name".to_string(), "$.name".to_string()),
            ("app.version".to_string(), "$.version".to_string()),
            ("nested.value".to_string(), "$.nested.value".to_string()),
        ]));
        let mut props = store();
        let written = rules.apply(JSON_BODY, &mut props);

        assert_eq!(written.len(), 3);
        assert_eq!(props["app.name"], "test");
        assert_eq!(props["app.version"], "1.0");
        assert_eq!(props["nested.value"], "nested-data");
    }

    #[test]
    fn missing_json_path_leaves_only_that_property_unset() {
        let rules = ExtractionRules::JsonPaths(BTreeMap::from([
            ("a".to_string(), "$.absent".to_string()),
            ("b".to_string(), "$.name".to_string()),
            ("c".to_string(), "$[?(bad)]".to_string()),
        ]));
        let mut props = store();
        let written = rules.apply(JSON_BODY, &mut props);

        assert_eq!(written, vec!["b".to_string()]);
        assert!(!props.contains_key("a"));
        assert!(!props.contains_key("c"));
        assert_eq!(props["b"], "test");
    }

    #[test]
    fn non_string_values_are_rendered_as_text() {
        let mut props = store();
        assert_eq!(extract_json(JSON_BODY, "$.build", "n", &mut props).unwrap(), "7");
        assert_eq!(extract_json(JSON_BODY, "$.ok", "b", &mut props).unwrap(), "true");
        assert_eq!(
            extract_json(JSON_BODY, "$.nested", "o", &mut props).unwrap(),
            r#"{"value":"nested-data"}"#
        );
    }

    #[test]
    fn filters_slices_and_unions_extract_values() {
        let body = r#"{"items":[{"id":1,"tag":"a"},{"id":2,"tag":"b"}]}"#;
        let mut props = store();

        let value = extract_json(body, "$.items[?(@.id == 2)].tag", "f", &mut props).unwrap();
        assert_eq!(value, r#"["b"]"#);
        let value = extract_json(body, "$.items[0:1].tag", "s", &mut props).unwrap();
        assert_eq!(value, r#"["a"]"#);
        let value = extract_json(body, "$.items[0,1].id", "u", &mut props).unwrap();
        assert_eq!(value, "[1,2]");

        assert_eq!(props.len(), 3);
        assert_eq!(props["f"], r#"["b"]"#);
    }

    #[test]
    fn malformed_json_is_an_error_without_side_effects() {
        let mut props = store();
        let err = extract_json("<html>", "$.name", "p", &mut props).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidJson(_)));
        assert!(props.is_empty());
    }

    #[test]
    fn regex_rules_use_first_group() {
        let rules = ExtractionRules::Patterns(BTreeMap::from([
            ("page.title".to_string(), "<title>([^<]+)</title>".to_string()),
            ("page.heading".to_string(), "<h1>([^<]+)</h1>".to_string()),
        ]));
        let mut props = store();
        rules.apply(HTML_BODY, &mut props);

        assert_eq!(props["page.title"], "Test Page");
        assert_eq!(props["page.heading"], "Welcome");
    }

    #[test]
    fn regex_without_groups_uses_whole_match() {
        let mut props = store();
        let value = extract_regex(HTML_BODY, "<h1>[^<]+</h1>", "h", &mut props).unwrap();
        assert_eq!(value, "<h1>Welcome</h1>");
        assert_eq!(props["h"], "<h1>Welcome</h1>");
    }

    #[test]
    fn regex_search_is_unanchored_and_takes_first_match() {
        let mut props = store();
        let value = extract_regex("a1 b2 c3", r"[a-z](\d)", "d", &mut props).unwrap();
        assert_eq!(value, "1");
    }

    #[test]
    fn regex_no_match_and_bad_pattern_do_not_stop_siblings() {
        let rules = ExtractionRules::Patterns(BTreeMap::from([
            ("absent".to_string(), "<h2>(.*)</h2>".to_string()),
            ("broken".to_string(), "(unclosed".to_string()),
            ("title".to_string(), "<title>(.*)</title>".to_string()),
        ]));
        let mut props = store();
        let written = rules.apply(HTML_BODY, &mut props);

        assert_eq!(written, vec!["title".to_string()]);
        assert_eq!(props.len(), 1);
        assert_eq!(props["title"], "Test Page");
    }

    #[test]
    fn regex_errors_are_classified() {
        let mut props = store();
        assert!(extract_regex("x", "y", "p", &mut props)
            .unwrap_err()
            .is_not_found());
        assert!(matches!(
            extract_regex("x", "(", "p", &mut props).unwrap_err(),
            ExtractError::InvalidPattern(_)
        ));
    }

    #[test]
    fn precedence_prefers_json_paths_over_everything() {
        let config = HttpCallConfig::new("http://x")
            .with_extract_pattern("p")
            .with_extract_patterns([("r", "p")])
            .with_json_path("$.a")
            .with_json_paths([("j", "$.b")]);
        assert_eq!(
            ExtractionRules::resolve(&config),
            ExtractionRules::JsonPaths(BTreeMap::from([("j".to_string(), "$.b".to_string())]))
        );
    }

    #[test]
    fn precedence_order_below_json_paths() {
        let config = HttpCallConfig::new("http://x")
            .with_output_property("out")
            .with_extract_pattern("p")
            .with_extract_patterns([("r", "q")])
            .with_json_path("$.a");
        assert_eq!(
            ExtractionRules::resolve(&config),
            ExtractionRules::JsonPath {
                expression: "$.a".to_string(),
                property: "out".to_string()
            }
        );

        let config = HttpCallConfig::new("http://x")
            .with_extract_pattern("p")
            .with_extract_patterns([("r", "q")]);
        assert_eq!(
            ExtractionRules::resolve(&config),
            ExtractionRules::Patterns(BTreeMap::from([("r".to_string(), "q".to_string())]))
        );

        let config = HttpCallConfig::new("http://x").with_extract_pattern("p");
        assert_eq!(
            ExtractionRules::resolve(&config),
            ExtractionRules::Pattern {
                pattern: "p".to_string(),
                property: "http.response".to_string()
            }
        );

        assert!(ExtractionRules::resolve(&HttpCallConfig::new("http://x")).is_none());
    }

    #[test]
    fn single_rules_write_output_property() {
        let mut props = store();
        ExtractionRules::JsonPath {
            expression: "$.version".to_string(),
            property: "http.response".to_string(),
        }
        .apply(JSON_BODY, &mut props);
        assert_eq!(props["http.response"], "1.0");

        let mut props = store();
        ExtractionRules::Pattern {
            pattern: "<h1>(.*)</h1>".to_string(),
            property: "heading".to_string(),
        }
        .apply(HTML_BODY, &mut props);
        assert_eq!(props["heading"], "Welcome");
    }
}
