//! HTTP request and response types exchanged with the transport.
//!
//! # Design
//! Requests and responses are plain data. The request builder produces an
//! `HttpRequest`, a `Transport` turns it into an `HttpResponse`, and the
//! response processor consumes that response. Nothing here touches the
//! network, so every stage can be driven from tests with hand-written values.
//!
//! All fields use owned types (`String`, `Vec`) so values can be moved between
//! the retry loop and the transport without lifetime concerns.

use std::fmt;
use std::time::Duration;

/// HTTP method for a request.
///
/// The four common verbs get their own variants; anything else is carried
/// through verbatim in `Other` and left for the transport to accept or reject.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Other(String),
}

impl HttpMethod {
    /// Parse a configured method name. Known verbs match case-insensitively.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical request, described as plain data.
///
/// Built once per invocation by `build_request` and replayed unchanged on
/// every retry attempt. `timeout` bounds both the connect phase and the whole
/// exchange of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// A received HTTP response, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// True for 4xx and 5xx statuses.
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }

    /// First header value whose name matches case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_methods_parse_case_insensitively() {
        assert_eq!(HttpMethod::parse("get"), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("Post"), HttpMethod::Post);
        assert_eq!(HttpMethod::parse("PUT"), HttpMethod::Put);
        assert_eq!(HttpMethod::parse(" delete "), HttpMethod::Delete);
    }

    #[test]
    fn unknown_methods_are_kept_verbatim() {
        let method = HttpMethod::parse("PATCH");
        assert_eq!(method, HttpMethod::Other("PATCH".to_string()));
        assert_eq!(method.as_str(), "PATCH");
    }

    #[test]
    fn error_status_starts_at_400() {
        let mut response = HttpResponse {
            status: 399,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(!response.is_error_status());
        response.status = 400;
        assert!(response.is_error_status());
        response.status = 503;
        assert!(response.is_error_status());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("x-missing"), None);
    }
}
