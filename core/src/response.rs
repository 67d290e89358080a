//! Classification and post-processing of a received response.
//!
//! Side effects happen in a fixed order: classify the status, persist the body
//! if a response file is configured, raise the fatal status error if there is
//! one, and only then run extraction. The body is therefore saved even for a
//! response that is about to fail the build.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::HttpCallError;
use crate::extract::ExtractionRules;
use crate::http::HttpResponse;
use crate::store::PropertyStore;

/// What processing a non-fatal response produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResult {
    pub status: u16,
    /// Properties written by extraction, in evaluation order.
    pub properties: Vec<String>,
    /// Where the body was saved, if persistence was configured and succeeded.
    pub saved_to: Option<PathBuf>,
}

/// Applies the fail policy, persistence and extraction to a response.
#[derive(Debug, Clone)]
pub struct ResponseProcessor<'a> {
    fail_on_error: bool,
    response_file: Option<&'a Path>,
    rules: &'a ExtractionRules,
}

impl<'a> ResponseProcessor<'a> {
    pub fn new(rules: &'a ExtractionRules, fail_on_error: bool) -> Self {
        Self {
            fail_on_error,
            response_file: None,
            rules,
        }
    }

    pub fn with_response_file(mut self, path: Option<&'a Path>) -> Self {
        self.response_file = path;
        self
    }

    pub fn process(
        &self,
        response: &HttpResponse,
        store: &mut dyn PropertyStore,
    ) -> Result<ProcessedResult, HttpCallError> {
        let status = response.status;
        info!("HTTP response status: {status}");
        let fatal = response.is_error_status() && self.fail_on_error;

        let saved_to = self.response_file.and_then(|path| persist(path, &response.body));

        if fatal {
            return Err(HttpCallError::HttpStatus { status });
        }
        if response.is_error_status() {
            warn!("HTTP request returned status {status}, continuing since failOnError is off");
        }

        let properties = self.rules.apply(&response.body, store);
        Ok(ProcessedResult {
            status,
            properties,
            saved_to,
        })
    }
}

fn persist(path: &Path, body: &str) -> Option<PathBuf> {
    match fs::write(path, body.as_bytes()) {
        Ok(()) => {
            info!("Response saved to: {}", path.display());
            Some(path.to_path_buf())
        }
        Err(err) => {
            warn!("Failed to save response to file {}: {err}", path.display());
            None
        }
    }
}
