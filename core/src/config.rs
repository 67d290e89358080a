//! Configuration for one HTTP call invocation.
//!
//! # Design
//! The host supplies options as a flat document using camelCase names
//! (`url`, `retryCount`, `jsonPaths`, ...). `HttpCallConfig` deserializes that
//! document directly with serde, filling the documented defaults for every
//! absent option, and rejects option names it does not recognize.
//!
//! The config is immutable once built. The other stages never read it
//! field-by-field; they take the derived views `retry_policy()` and
//! `extraction_rules()`, plus `build_request` for the request itself.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::extract::ExtractionRules;
use crate::retry::RetryPolicy;

pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_OUTPUT_PROPERTY: &str = "http.response";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

fn default_output_property() -> String {
    DEFAULT_OUTPUT_PROPERTY.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retry_delay() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_true() -> bool {
    true
}

/// Every option an invocation recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HttpCallConfig {
    pub url: String,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Sent URL-encoded; wins over `body` when non-empty.
    #[serde(default)]
    pub form_data: BTreeMap<String, String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub extract_pattern: Option<String>,

    #[serde(default)]
    pub extract_patterns: BTreeMap<String, String>,

    #[serde(default)]
    pub json_path: Option<String>,

    #[serde(default)]
    pub json_paths: BTreeMap<String, String>,

    /// Accepted for compatibility, never evaluated.
    #[serde(default)]
    pub xpath: Option<String>,

    /// Accepted for compatibility, never evaluated.
    #[serde(default)]
    pub xpaths: BTreeMap<String, String>,

    /// Property written by the single-rule extraction variants.
    #[serde(default = "default_output_property")]
    pub output_property: String,

    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub retry_count: u32,

    /// Delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,

    #[serde(default)]
    pub skip_on_failure: bool,

    #[serde(default)]
    pub response_file: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub fail_on_error: bool,
}

impl HttpCallConfig {
    /// A configuration for `url` with every other option at its default.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: BTreeMap::new(),
            form_data: BTreeMap::new(),
            body: None,
            extract_pattern: None,
            extract_patterns: BTreeMap::new(),
            json_path: None,
            json_paths: BTreeMap::new(),
            xpath: None,
            xpaths: BTreeMap::new(),
            output_property: default_output_property(),
            timeout: DEFAULT_TIMEOUT_SECS,
            retry_count: 0,
            retry_delay: DEFAULT_RETRY_DELAY_MS,
            skip_on_failure: false,
            response_file: None,
            fail_on_error: true,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_data.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json_path(mut self, expression: impl Into<String>) -> Self {
        self.json_path = Some(expression.into());
        self
    }

    pub fn with_json_paths<K, V>(mut self, rules: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.json_paths
            .extend(rules.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_extract_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.extract_pattern = Some(pattern.into());
        self
    }

    pub fn with_extract_patterns<K, V>(mut self, rules: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.extract_patterns
            .extend(rules.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_output_property(mut self, name: impl Into<String>) -> Self {
        self.output_property = name.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = secs;
        self
    }

    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn with_retry_delay_ms(mut self, millis: u64) -> Self {
        self.retry_delay = millis;
        self
    }

    pub fn with_skip_on_failure(mut self, skip: bool) -> Self {
        self.skip_on_failure = skip;
        self
    }

    pub fn with_response_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.response_file = Some(path.into());
        self
    }

    pub fn with_fail_on_error(mut self, fail: bool) -> Self {
        self.fail_on_error = fail;
        self
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_count.saturating_add(1),
            delay: Duration::from_millis(self.retry_delay),
            fail_on_error: self.fail_on_error,
        }
    }

    pub fn extraction_rules(&self) -> ExtractionRules {
        ExtractionRules::resolve(self)
    }

    /// True when XPath options are present; they are never evaluated.
    pub fn has_xpath(&self) -> bool {
        self.xpath.is_some() || !self.xpaths.is_empty()
    }
}
