//! Request execution
//!
//! [`ApiClient`](crate::ApiClient) describes requests as [`ApiRequest`] values
//! and hands them to a [`Transport`]. The default [`HttpTransport`] sends
//! URL targets with reqwest and reads file targets from disk.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::ApiError;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A remote endpoint.
    Url(Url),
    /// A static JSON file on disk.
    File(PathBuf),
}

impl Target {
    /// Join `tail` onto `base`, which is either an http(s) URL or a directory.
    pub fn join(base: &str, tail: &str) -> Result<Self, ApiError> {
        let base = base.trim_end_matches('/');
        let tail = tail.trim_start_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            let raw = format!("{}/{}", base, tail);
            Url::parse(&raw)
                .map(Target::Url)
                .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
        } else {
            Ok(Target::File(PathBuf::from(base).join(tail)))
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Url(url) => write!(f, "{}", url),
            Target::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A single request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub target: Target,
    pub body: Option<Value>,
    /// Cancelling this token aborts the request with [`ApiError::Aborted`].
    pub cancel: Option<CancellationToken>,
}

impl ApiRequest {
    pub fn get(target: Target) -> Self {
        Self {
            method: Method::Get,
            target,
            body: None,
            cancel: None,
        }
    }

    pub fn new(method: Method, target: Target) -> Self {
        Self {
            method,
            target,
            body: None,
            cancel: None,
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Executes requests and returns the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// reqwest-backed transport that also serves local files.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Sets the per-request timeout for URL targets.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn dispatch(&self, method: Method, target: Target, body: Option<Value>) -> Result<Value, ApiError> {
        match target {
            Target::Url(url) => self.fetch(method, url, body).await,
            Target::File(path) => {
                if method != Method::Get {
                    return Err(ApiError::InvalidUrl(format!(
                        "{} only supports reads",
                        path.display()
                    )));
                }
                let text = tokio::fs::read_to_string(&path).await?;
                parse_body(&text)
            }
        }
    }

    async fn fetch(&self, method: Method, url: Url, body: Option<Value>) -> Result<Value, ApiError> {
        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(body) = &body {
            request = request.json(body);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            };
            return Err(ApiError::http(status.as_u16(), message));
        }
        parse_body(&text)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        log::debug!("{:?} {}", request.method, request.target);
        let ApiRequest {
            method,
            target,
            body,
            cancel,
        } = request;

        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ApiError::Aborted),
                    result = self.dispatch(method, target, body) => result,
                }
            }
            None => self.dispatch(method, target, body).await,
        }
    }
}

/// Decode a response body. Empty bodies decode to `null`.
fn parse_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::parse_with_body(e.to_string(), text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_base() {
        let target = Target::join("https://example.com/api/v1/", "/frameworks").unwrap();
        assert_eq!(
            target,
            Target::Url(Url::parse("https://example.com/api/v1/frameworks").unwrap())
        );
    }

    #[test]
    fn test_join_directory_base() {
        let target = Target::join("./public/api/", "frameworks.json").unwrap();
        assert_eq!(target, Target::File(PathBuf::from("./public/api/frameworks.json")));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body("  ").unwrap(), Value::Null);
        assert_eq!(parse_body("[1]").unwrap(), serde_json::json!([1]));
        match parse_body("{oops") {
            Err(ApiError::Parse { body, .. }) => assert_eq!(body.as_deref(), Some("{oops")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frameworks.json"), r#"[{"id":"iso"}]"#).unwrap();

        let transport = HttpTransport::new(Client::new());
        let target = Target::join(&dir.path().to_string_lossy(), "frameworks.json").unwrap();
        let value = transport.send(ApiRequest::get(target)).await.unwrap();
        assert_eq!(value[0]["id"], "iso");
    }

    #[tokio::test]
    async fn test_cancelled_request_is_aborted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rows.json"), "[]").unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let transport = HttpTransport::new(Client::new());
        let target = Target::join(&dir.path().to_string_lossy(), "rows.json").unwrap();
        let err = transport
            .send(ApiRequest::get(target).cancel(token))
            .await
            .unwrap_err();
        assert!(err.is_aborted());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let transport = HttpTransport::new(Client::new());
        let err = transport
            .send(ApiRequest::get(Target::File("/nonexistent/compass.json".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
    }
}
