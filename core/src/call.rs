//! One complete invocation: build, send with retries, process.
//!
//! # Design
//! `HttpCall` owns the configuration and the retry executor and borrows the
//! host's property store only for the duration of `execute`. Nothing survives
//! between invocations.
//!
//! Outcomes that stop the build come back as `Err(HttpCallError)`. Everything
//! else, including a skipped call and a transport failure that is tolerated
//! because `failOnError` is off, is an `Ok(Invocation)`.

use tracing::{info, warn};

use crate::config::HttpCallConfig;
use crate::error::{HttpCallError, TransportError};
use crate::extract::ExtractionRules;
use crate::request::build_request;
use crate::response::{ProcessedResult, ResponseProcessor};
use crate::retry::{Interrupt, Pause, RetryExecutor};
use crate::store::{PropertyStore, EXECUTION_FAILED_KEY};
use crate::transport::Transport;

/// Non-fatal result of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `skipOnFailure` was set and an earlier step had failed.
    Skipped,
    /// A response was received and processed.
    Completed(ProcessedResult),
    /// Every attempt failed at the transport level and `failOnError` is off.
    Abandoned(TransportError),
}

/// A configured HTTP call ready to run against a property store.
#[derive(Debug, Clone)]
pub struct HttpCall<T, P = Interrupt> {
    config: HttpCallConfig,
    executor: RetryExecutor<T, P>,
}

impl<T: Transport> HttpCall<T> {
    pub fn new(config: HttpCallConfig, transport: T) -> Self {
        Self {
            config,
            executor: RetryExecutor::new(transport),
        }
    }
}

impl<T: Transport, P: Pause> HttpCall<T, P> {
    /// Replace the pause used between attempts, e.g. with a shared `Interrupt`.
    pub fn with_pause<Q: Pause>(self, pause: Q) -> HttpCall<T, Q> {
        HttpCall {
            config: self.config,
            executor: self.executor.with_pause(pause),
        }
    }

    pub fn config(&self) -> &HttpCallConfig {
        &self.config
    }

    pub fn execute(&self, store: &mut dyn PropertyStore) -> Result<Invocation, HttpCallError> {
        let config = &self.config;
        if config.skip_on_failure && store.has(EXECUTION_FAILED_KEY) {
            info!("Skipping HTTP call due to previous failure");
            return Ok(Invocation::Skipped);
        }

        let request = build_request(config);
        info!("Making HTTP {} call to: {}", request.method, request.url);

        let rules = ExtractionRules::resolve(config);
        if rules.is_none() && config.has_xpath() {
            warn!("XPath extraction is not supported, ignoring xpath options");
        }

        let policy = config.retry_policy();
        match self.executor.execute(&request, &policy) {
            Ok(response) => ResponseProcessor::new(&rules, config.fail_on_error)
                .with_response_file(config.response_file.as_deref())
                .process(&response, store)
                .map(Invocation::Completed),
            Err(failure) if policy.fail_on_error => Err(failure.into()),
            Err(failure) => {
                warn!(
                    "HTTP call failed after {} attempts: {}",
                    failure.attempts, failure.last_error
                );
                Ok(Invocation::Abandoned(failure.last_error))
            }
        }
    }
}
