//! Main ApiClient

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, Error};
use crate::model::{
    ControlItem, ControlItemUpdate, CreatedFramework, Framework, NewFramework, update_payload,
};
use crate::transport::{ApiRequest, HttpTransport, Method, Target, Transport};

/// Default REST service base.
pub const DEFAULT_SERVICE_BASE: &str = "https://bk-backend.vercel.app/api/v1";

/// Default directory (or URL) holding the static JSON files.
pub const DEFAULT_JSON_BASE: &str = "./public/api";

/// Where the client reads data from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiMode {
    /// REST service only.
    Service,
    /// Static JSON files only.
    Json,
    /// REST service, falling back to static JSON on failure.
    #[default]
    Auto,
}

impl ApiMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiMode::Service => "service",
            ApiMode::Json => "json",
            ApiMode::Auto => "auto",
        }
    }
}

impl fmt::Display for ApiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "service" => Ok(ApiMode::Service),
            "json" => Ok(ApiMode::Json),
            "auto" => Ok(ApiMode::Auto),
            other => Err(format!("unknown api mode '{}' (expected service, json or auto)", other)),
        }
    }
}

/// Client for the compliance framework backend.
///
/// Cheap to clone; clones share the same transport and in-flight request.
///
/// # Example
///
/// ```ignore
/// let client = ApiClient::builder()
///     .mode(ApiMode::Json)
///     .json_base("./public/api")
///     .build()?;
///
/// let frameworks = client.get_frameworks().await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    mode: ApiMode,
    service_base: String,
    json_base: String,
    transport: Arc<dyn Transport>,
    /// Token of the current abortable request, tagged with its ticket.
    in_flight: Mutex<Option<(u64, CancellationToken)>>,
    next_ticket: AtomicU64,
}

impl ApiClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    pub fn mode(&self) -> ApiMode {
        self.inner.mode
    }

    pub fn service_base(&self) -> &str {
        &self.inner.service_base
    }

    pub fn json_base(&self) -> &str {
        &self.inner.json_base
    }

    /// Cancel the in-flight abortable request, if any.
    pub fn abort(&self) {
        if let Some((_, token)) = self.lock_in_flight().take() {
            token.cancel();
        }
    }

    /// Whether an abortable request is in flight.
    pub fn has_in_flight(&self) -> bool {
        self.lock_in_flight().is_some()
    }

    /// List all frameworks.
    ///
    /// Accepts a bare array or one wrapped in `data`, `items` or `rows`.
    /// Entries that do not describe a framework are skipped.
    pub async fn get_frameworks(&self) -> Result<Vec<Framework>, Error> {
        let value = self.read("/frameworks", "frameworks.json", None).await?;
        Ok(pick_frameworks(&value))
    }

    /// Fetch the control items of a framework.
    ///
    /// Starting this request cancels any earlier abortable request still in
    /// flight. Cancelling `signal`, or calling [`abort`](Self::abort), ends
    /// it with [`ApiError::Aborted`].
    pub async fn get_framework_rows(
        &self,
        id: &str,
        signal: Option<&CancellationToken>,
    ) -> Result<Vec<ControlItem>, Error> {
        let (ticket, token) = self.begin_abortable(signal);
        let result = self.rows(id, Some(token)).await;
        self.finish_abortable(ticket);
        result
    }

    /// Fetch the control items of a framework outside abort tracking.
    ///
    /// Used for lookups that must not cancel, or be cancelled by, the
    /// abortable request.
    pub async fn fetch_framework_rows(&self, id: &str) -> Result<Vec<ControlItem>, Error> {
        self.rows(id, None).await
    }

    /// Create a framework.
    ///
    /// In json mode nothing is sent; a local id is made up instead.
    pub async fn create_framework(&self, payload: &NewFramework) -> Result<CreatedFramework, Error> {
        let body = to_body(payload)?;
        if self.inner.mode == ApiMode::Json {
            let id = format!("local-{}", chrono::Utc::now().timestamp_millis());
            return Ok(CreatedFramework::from_body(local_echo(Some(id), body)));
        }
        let target = Target::join(&self.inner.service_base, "/frameworks")?;
        let value = self
            .inner
            .transport
            .send(ApiRequest::new(Method::Post, target).body(body))
            .await?;
        Ok(CreatedFramework::from_body(value))
    }

    /// Add a control item to a framework.
    pub async fn add_control_item(&self, framework_id: &str, item: &ControlItem) -> Result<Value, Error> {
        let body = to_body(item)?;
        let path = format!("/frameworks/{}/controls", urlencoding::encode(framework_id));
        self.write(Method::Post, &path, Some(body)).await
    }

    /// Update fields of an existing control item.
    pub async fn update_control_item(
        &self,
        framework_id: &str,
        control_id: &str,
        update: &ControlItemUpdate,
    ) -> Result<Value, Error> {
        let path = format!(
            "/frameworks/{}/controls/{}",
            urlencoding::encode(framework_id),
            urlencoding::encode(control_id)
        );
        self.write(Method::Put, &path, Some(update_payload(control_id, update)))
            .await
    }

    /// Delete a control item.
    pub async fn delete_control_item(&self, framework_id: &str, control_id: &str) -> Result<Value, Error> {
        let path = format!(
            "/frameworks/{}/controls/{}",
            urlencoding::encode(framework_id),
            urlencoding::encode(control_id)
        );
        self.write(Method::Delete, &path, None).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn rows(&self, id: &str, cancel: Option<CancellationToken>) -> Result<Vec<ControlItem>, Error> {
        let path = format!("/frameworks/{}/controls", urlencoding::encode(id));
        let file = json_file_name(id)?;
        let value = self.read(&path, &file, cancel).await?;
        Ok(ControlItem::list_from_json(&value))
    }

    /// Read from the source selected by the mode.
    async fn read(
        &self,
        service_path: &str,
        json_file: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<Value, ApiError> {
        match self.inner.mode {
            ApiMode::Service => self.get(&self.inner.service_base, service_path, cancel).await,
            ApiMode::Json => self.get(&self.inner.json_base, json_file, cancel).await,
            ApiMode::Auto => {
                match self
                    .get(&self.inner.service_base, service_path, cancel.clone())
                    .await
                {
                    Err(e) if !e.is_aborted() => {
                        log::debug!("Service read failed ({}), falling back to {}", e, json_file);
                        self.get(&self.inner.json_base, json_file, cancel).await
                    }
                    result => result,
                }
            }
        }
    }

    async fn get(
        &self,
        base: &str,
        tail: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<Value, ApiError> {
        let mut request = ApiRequest::get(Target::join(base, tail)?);
        request.cancel = cancel;
        self.inner.transport.send(request).await
    }

    /// Send a mutation; json mode echoes the payload locally.
    async fn write(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, Error> {
        if self.inner.mode == ApiMode::Json {
            return Ok(local_echo(None, body.unwrap_or(Value::Null)));
        }
        let target = Target::join(&self.inner.service_base, path)?;
        let mut request = ApiRequest::new(method, target);
        request.body = body;
        Ok(self.inner.transport.send(request).await?)
    }

    fn begin_abortable(&self, signal: Option<&CancellationToken>) -> (u64, CancellationToken) {
        let token = signal.map_or_else(CancellationToken::new, CancellationToken::child_token);
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        if let Some((_, previous)) = self.lock_in_flight().replace((ticket, token.clone())) {
            previous.cancel();
        }
        (ticket, token)
    }

    fn finish_abortable(&self, ticket: u64) {
        let mut slot = self.lock_in_flight();
        if slot.as_ref().is_some_and(|(t, _)| *t == ticket) {
            *slot = None;
        }
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, Option<(u64, CancellationToken)>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("mode", &self.inner.mode)
            .field("service_base", &self.inner.service_base)
            .field("json_base", &self.inner.json_base)
            .finish_non_exhaustive()
    }
}

fn pick_frameworks(value: &Value) -> Vec<Framework> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => ["data", "items", "rows"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(framework) => Some(framework),
            Err(e) => {
                log::warn!("Skipping malformed framework entry: {}", e);
                None
            }
        })
        .collect()
}

/// Static file name for a framework's rows.
fn json_file_name(id: &str) -> Result<String, ApiError> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return Err(ApiError::InvalidUrl(format!("invalid framework id '{}'", id)));
    }
    Ok(format!("{}.json", id))
}

fn to_body(value: &impl serde::Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::parse(e.to_string()))
}

/// `{ ok: true, id?, ...payload }`
fn local_echo(id: Option<String>, payload: Value) -> Value {
    let mut map = Map::new();
    map.insert("ok".into(), Value::Bool(true));
    if let Some(id) = id {
        map.insert("id".into(), Value::String(id));
    }
    if let Value::Object(fields) = payload {
        map.extend(fields);
    }
    Value::Object(map)
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for constructing an [`ApiClient`].
///
/// # Example
///
/// ```ignore
/// let client = ApiClient::builder()
///     .service_base("https://example.com/api/v1")
///     .mode(ApiMode::Auto)
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct ApiClientBuilder {
    mode: ApiMode,
    service_base: String,
    json_base: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            mode: ApiMode::default(),
            service_base: DEFAULT_SERVICE_BASE.to_string(),
            json_base: DEFAULT_JSON_BASE.to_string(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
            transport: None,
        }
    }

    pub fn mode(mut self, mode: ApiMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the REST service base. A trailing slash is dropped.
    pub fn service_base(mut self, base: impl Into<String>) -> Self {
        self.service_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the static JSON base. A trailing slash is dropped.
    pub fn json_base(mut self, base: impl Into<String>) -> Self {
        self.json_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replaces the transport entirely. HTTP settings are then ignored.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the [`ApiClient`].
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let client = match self.http_client {
                    Some(client) => client,
                    None => {
                        let mut builder = Client::builder();
                        if let Some(timeout) = self.connect_timeout {
                            builder = builder.connect_timeout(timeout);
                        }
                        builder.build()?
                    }
                };
                let mut http = HttpTransport::new(client);
                if let Some(timeout) = self.timeout {
                    http = http.timeout(timeout);
                }
                Arc::new(http) as Arc<dyn Transport>
            }
        };

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                mode: self.mode,
                service_base: self.service_base,
                json_base: self.json_base,
                transport,
                in_flight: Mutex::new(None),
                next_ticket: AtomicU64::new(0),
            }),
        })
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("JSON".parse::<ApiMode>(), Ok(ApiMode::Json));
        assert_eq!(" auto ".parse::<ApiMode>(), Ok(ApiMode::Auto));
        assert!("offline".parse::<ApiMode>().is_err());
        assert_eq!(ApiMode::Service.to_string(), "service");
    }

    #[test]
    fn test_pick_frameworks_wrappers() {
        let entry = json!({ "id": "iso", "name": "ISO 27001" });
        assert_eq!(pick_frameworks(&json!([entry.clone()])).len(), 1);
        assert_eq!(pick_frameworks(&json!({ "data": [entry.clone()] })).len(), 1);
        assert_eq!(pick_frameworks(&json!({ "items": [entry.clone()] })).len(), 1);
        assert_eq!(pick_frameworks(&json!({ "rows": [entry.clone(), { "bad": 1 }] })).len(), 1);
        assert!(pick_frameworks(&json!({ "total": 3 })).is_empty());
        assert!(pick_frameworks(&json!("nope")).is_empty());
    }

    #[test]
    fn test_json_file_name_rejects_paths() {
        assert_eq!(json_file_name("iso-27001").unwrap(), "iso-27001.json");
        assert!(json_file_name("../secrets").is_err());
        assert!(json_file_name("a/b").is_err());
        assert!(json_file_name("").is_err());
    }

    #[test]
    fn test_local_echo_keeps_payload() {
        let echo = local_echo(Some("local-1".into()), json!({ "name": "NIST" }));
        assert_eq!(echo, json!({ "ok": true, "id": "local-1", "name": "NIST" }));
    }
}
