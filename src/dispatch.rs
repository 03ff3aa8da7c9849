//! Request dispatch and response normalization shared by every endpoint.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONNECTION, HeaderMap, RETRY_AFTER, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{ApiError, Client, Error, Result};

const ACCEPT_VALUE: &str = "application/json";
const API_KEY_HEADER: &str = "hibp-api-key";

/// Whether a request must carry the API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Public,
    Authenticated,
}

/// One request: resource path relative to the base URL, an optional
/// caller-supplied trailing segment, query parameters in the order they are
/// appended, and the access level.
#[derive(Debug, Clone)]
pub(crate) struct Query {
    path: String,
    segment: Option<String>,
    params: Vec<(&'static str, String)>,
    access: Access,
}

impl Query {
    pub(crate) fn public(path: impl Into<String>) -> Self {
        Self::new(path.into(), Access::Public)
    }

    pub(crate) fn authenticated(path: impl Into<String>) -> Self {
        Self::new(path.into(), Access::Authenticated)
    }

    fn new(path: String, access: Access) -> Self {
        Self {
            path,
            segment: None,
            params: Vec::new(),
            access,
        }
    }

    /// Append a user value as one path segment. `/`, `?`, `#` and `%` in it
    /// are percent-encoded so it cannot change the route or the query.
    pub(crate) fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub(crate) fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }
}

/// Documented error body, e.g. `{"statusCode":429,"message":"Rate limit is exceeded."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "statusCode")]
    status_code: i64,
}

impl Client {
    /// Resolve the query against the base URL and append its parameters.
    pub(crate) fn target_url(&self, query: &Query) -> Result<Url> {
        let mut url = self.base_url.join(&query.path)?;
        if let Some(segment) = &query.segment {
            url.path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                .push(segment);
        }
        if !query.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send a GET for `query`, racing the exchange against `cancel`.
    ///
    /// The response is handed back untouched; every non-200 status is left
    /// for [`Client::fetch`] to interpret.
    pub(crate) async fn dispatch(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let url = self.target_url(query)?;

        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(USER_AGENT, &self.user_agent)
            .header(CONNECTION, "close");

        if query.access == Access::Authenticated {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        tracing::debug!(path = %query.path, access = ?query.access, "dispatching request");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = request.send() => response?,
        };

        tracing::debug!(path = %query.path, status = %response.status(), "response received");
        Ok(response)
    }

    /// Dispatch `query`, drain the body and decode it as `T` on 200.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let response = self.dispatch(&query, cancel).await?;
        let status = response.status();
        let retry_after = retry_after(response.headers());

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            body = response.bytes() => body?,
        };

        if status != StatusCode::OK {
            return Err(api_error(status, retry_after, &body).into());
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Build the error record for a non-200 response.
///
/// The retry hint is only kept when the body decodes as the documented
/// error shape; the fallback record always reports `retry_after = 0`.
fn api_error(status: StatusCode, retry_after: u64, body: &[u8]) -> ApiError {
    let code = status.as_u16();
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => {
            if parsed.status_code != i64::from(code) {
                tracing::debug!(
                    status = code,
                    body_status = parsed.status_code,
                    "error body status differs from response status"
                );
            }
            ApiError {
                code,
                message: parsed.message,
                description: String::new(),
                retry_after,
            }
        }
        Err(err) => ApiError {
            code,
            message: err.to_string(),
            description: status.canonical_reason().unwrap_or_default().to_string(),
            retry_after: 0,
        },
    }
}

/// Positive integer `retry-after` seconds, `0` when absent or unparseable.
fn retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn client(base_url: &str) -> Client {
        Client::builder("1234").base_url(base_url).build().unwrap()
    }

    #[test]
    fn resolves_paths_under_the_base_url() {
        let client = client("https://haveibeenpwned.com/api/v3/");
        let url = client
            .target_url(&Query::public("breach").segment("Adobe"))
            .unwrap();
        assert_eq!(url.as_str(), "https://haveibeenpwned.com/api/v3/breach/Adobe");

        let url = client
            .target_url(&Query::authenticated("breachedaccount").segment("info@example.com"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://haveibeenpwned.com/api/v3/breachedaccount/info@example.com"
        );
    }

    #[test]
    fn user_segments_cannot_escape_their_route() {
        let client = client("https://haveibeenpwned.com/api/v3/");

        let url = client
            .target_url(&Query::authenticated("breachedaccount").segment("a?b@example.com"))
            .unwrap();
        assert_eq!(url.path(), "/api/v3/breachedaccount/a%3Fb@example.com");
        assert_eq!(url.query(), None);

        let url = client
            .target_url(&Query::authenticated("pasteaccount").segment("a#b@example.com"))
            .unwrap();
        assert_eq!(url.path(), "/api/v3/pasteaccount/a%23b@example.com");
        assert_eq!(url.fragment(), None);

        let url = client
            .target_url(&Query::public("breach").segment("../dataclasses"))
            .unwrap();
        assert_eq!(url.path(), "/api/v3/breach/..%2Fdataclasses");

        let url = client
            .target_url(
                &Query::authenticated("breachedaccount")
                    .segment("a%2Fb@example.com")
                    .param("truncateResponse", "true"),
            )
            .unwrap();
        assert_eq!(url.path(), "/api/v3/breachedaccount/a%252Fb@example.com");
        assert_eq!(url.query(), Some("truncateResponse=true"));
    }

    #[test]
    fn base_url_without_trailing_slash_is_normalized() {
        let client = client("http://127.0.0.1:8080/api");
        let url = client.target_url(&Query::public("dataclasses")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/dataclasses");
    }

    #[test]
    fn query_parameters_are_encoded_in_order() {
        let client = client("https://haveibeenpwned.com/api/v3/");
        let query = Query::public("breaches")
            .param("domain", "a b&c.com")
            .param("truncateResponse", "true");
        let url = client.target_url(&query).unwrap();
        assert_eq!(url.query(), Some("domain=a+b%26c.com&truncateResponse=true"));

        let url = client.target_url(&Query::public("breaches")).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn malformed_resource_path_fails_resolution() {
        let client = client("https://haveibeenpwned.com/api/v3/");
        let err = client.target_url(&Query::public("http://[::1")).unwrap_err();
        assert!(matches!(err, Error::UrlResolution(_)));
    }

    #[test]
    fn error_record_from_documented_body() {
        let body = br#"{"message":"rate limited","statusCode":429}"#;
        let err = api_error(StatusCode::TOO_MANY_REQUESTS, 5, body);
        assert_eq!(
            err,
            ApiError {
                code: 429,
                message: "rate limited".into(),
                description: String::new(),
                retry_after: 5,
            }
        );
    }

    #[test]
    fn error_code_follows_transport_status() {
        let body = br#"{"message":"odd","statusCode":500}"#;
        let err = api_error(StatusCode::UNAUTHORIZED, 0, body);
        assert_eq!(err.code, 401);
        assert_eq!(err.message, "odd");
    }

    #[test]
    fn undecodable_body_falls_back_and_drops_retry_hint() {
        let err = api_error(StatusCode::SERVICE_UNAVAILABLE, 30, b"<html>down</html>");
        assert_eq!(err.code, 503);
        assert_eq!(err.description, "Service Unavailable");
        assert_eq!(err.retry_after, 0);
        assert!(!err.message.is_empty());

        let err = api_error(StatusCode::NOT_FOUND, 0, b"");
        assert_eq!(err.description, "Not Found");
    }

    #[test]
    fn retry_after_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), 0);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));
        assert_eq!(retry_after(&headers), 5);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("-3"));
        assert_eq!(retry_after(&headers), 0);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), 0);
    }
}
