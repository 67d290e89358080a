//! The capability that actually exchanges a request for a response.
//!
//! # Design
//! The retry loop only needs "send this request, give me a response or a
//! transport error", so that is all `Transport` promises. Any received
//! response is a success from the transport's point of view, including 4xx
//! and 5xx: status interpretation belongs to the response processor.
//!
//! `UreqTransport` is the blocking implementation used by the CLI. It builds a
//! fresh agent for every call so no connection is reused across attempts.

use ureq::http;

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP exchange per call.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking transport on top of `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        // Status codes are returned as data; the same timeout bounds the
        // connect phase and the whole exchange.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .timeout_connect(Some(request.timeout))
            .timeout_global(Some(request.timeout))
            .build()
            .new_agent();

        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        // POST and PUT without a configured body still send an empty one.
        let body = match (&request.method, &request.body) {
            (_, Some(body)) => Some(body.clone()),
            (HttpMethod::Post | HttpMethod::Put, None) => Some(String::new()),
            (_, None) => None,
        };
        let result = match body {
            Some(body) => {
                let req = builder.body(body).map_err(invalid_request)?;
                agent.run(req)
            }
            None => {
                let req = builder.body(()).map_err(invalid_request)?;
                agent.run(req)
            }
        };
        let mut response = result.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // No size cap: ureq limits `read_to_string` to 10 MB by default.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(classify)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn invalid_request(err: http::Error) -> TransportError {
    TransportError::new(TransportErrorKind::InvalidRequest, err.to_string())
}

fn classify(err: ureq::Error) -> TransportError {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
            TransportErrorKind::Connect
        }
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            TransportErrorKind::Timeout
        }
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => TransportErrorKind::InvalidRequest,
        _ => TransportErrorKind::Io,
    };
    TransportError::new(kind, err.to_string())
}
