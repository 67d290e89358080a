//! Request construction from configuration.
//!
//! `build_request` is pure: it never fails and never touches the network. A
//! malformed URL or header only surfaces once the transport tries to send it.

use crate::config::HttpCallConfig;
use crate::http::{HttpMethod, HttpRequest};

const CONTENT_TYPE: &str = "content-type";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Build the single logical request an invocation sends.
///
/// Body resolution: a non-empty `formData` map is URL-encoded and wins;
/// otherwise `body` is sent verbatim; otherwise the request has no body.
/// Form bodies get an `application/x-www-form-urlencoded` content type unless
/// the configured headers already name one.
pub fn build_request(config: &HttpCallConfig) -> HttpRequest {
    let mut headers: Vec<(String, String)> = config
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let body = if !config.form_data.is_empty() {
        let has_content_type = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE));
        if !has_content_type {
            headers.push((CONTENT_TYPE.to_string(), FORM_CONTENT_TYPE.to_string()));
        }
        Some(encode_form(
            config
                .form_data
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    } else {
        config.body.clone()
    };

    HttpRequest {
        method: HttpMethod::parse(&config.method),
        url: config.url.clone(),
        headers,
        body,
        timeout: config.timeout_duration(),
    }
}

/// Encode `key=value` pairs joined by `&`, escaping both sides the way HTML
/// forms do (space becomes `+`).
pub fn encode_form<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
