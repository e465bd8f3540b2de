// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-call HTTP adapter for the primary service.
//!
//! The body is always read as text first; whether it is JSON is decided
//! afterwards, never from the content type.

use crate::error::{PrimaryError, Result};
use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

/// Reason reported when a failed response carries no body.
pub const REQUEST_FAILED: &str = "Request failed";

#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl Transport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs one call and decodes the JSON body.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        form: Option<Form>,
    ) -> Result<T> {
        trace!(target: "primary", "{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(target: "primary", "response status: {}", status);

        let body = response.text().await?;
        trace!(target: "primary", "response body: {}", body);

        if !status.is_success() {
            return Err(PrimaryError::ApiError {
                status: status.as_u16(),
                message: failure_reason(&body),
            });
        }

        decode_body(&body)
    }

    /// Issues a GET and reports only the status code.
    pub async fn probe(&self, url: Url) -> Result<StatusCode> {
        trace!(target: "primary", "GET {}", url);
        let response = self.client.get(url).send().await?;
        Ok(response.status())
    }
}

/// Extracts a human-readable reason from a failed response body.
///
/// Prefers the JSON `error` field, then the raw body, then [`REQUEST_FAILED`].
pub fn failure_reason(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(error) }) if !error.is_empty() => error,
        _ if !body.trim().is_empty() => body.to_string(),
        _ => REQUEST_FAILED.to_string(),
    }
}

/// Decodes a successful response body.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn reason_prefers_error_field() {
        assert_eq!(
            failure_reason(r#"{"error":"song name is required"}"#),
            "song name is required"
        );
    }

    #[test]
    fn reason_falls_back_to_raw_body() {
        assert_eq!(failure_reason("502 Bad Gateway"), "502 Bad Gateway");
        // Valid JSON without a usable error field still reports the body.
        assert_eq!(failure_reason(r#"{"detail":"nope"}"#), r#"{"detail":"nope"}"#);
        assert_eq!(failure_reason(r#"{"error":42}"#), r#"{"error":42}"#);
    }

    #[test]
    fn reason_for_empty_body() {
        assert_eq!(failure_reason(""), REQUEST_FAILED);
        assert_eq!(failure_reason("  \n"), REQUEST_FAILED);
    }

    #[test]
    fn invalid_success_body_is_distinct_failure() {
        let err = decode_body::<Value>("<html>ok</html>").unwrap_err();
        assert!(matches!(err, PrimaryError::InvalidJson(_)));
        assert_eq!(err.to_string(), "Invalid JSON response");
    }

    #[test]
    fn valid_success_body_decodes() {
        let value: Value = decode_body(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(value["status"], "ok");
    }
}
