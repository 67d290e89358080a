//! Single-request HTTP call with retries and response value extraction.
//!
//! # Overview
//! One invocation builds a request from `HttpCallConfig`, sends it through a
//! bounded retry loop, classifies the response status against the fail
//! policy, optionally saves the body to a file, and extracts named values
//! from the body (JSONPath or regex) into a host-supplied property store.
//!
//! # Design
//! - Request building, retrying and response processing are separate stages
//!   connected by plain `HttpRequest` / `HttpResponse` values.
//! - The network is reached only through the `Transport` trait, so every stage
//!   can run against scripted transports in tests. `UreqTransport` is the
//!   blocking implementation for real use.
//! - Only a received 4xx/5xx status or a transport failure that outlived every
//!   retry can fail the build, and only when `failOnError` is set. Extraction
//!   and persistence problems are logged and never abort sibling work.

pub mod call;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod jsonpath;
pub mod request;
pub mod response;
pub mod retry;
pub mod store;
pub mod transport;

pub use call::{HttpCall, Invocation};
pub use config::HttpCallConfig;
pub use error::{ExtractError, HttpCallError, TransportError, TransportErrorKind};
pub use extract::{extract_json, extract_regex, ExtractionRules};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::build_request;
pub use response::{ProcessedResult, ResponseProcessor};
pub use retry::{Interrupt, Interrupted, Pause, RetryExecutor, RetryPolicy, TerminalFailure};
pub use store::{PropertyStore, EXECUTION_FAILED_KEY};
pub use transport::{Transport, UreqTransport};
