//! Scripted transport shared by the integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use compass_lib::error::ApiError;
use compass_lib::transport::{ApiRequest, Method, Transport};
use compass_lib::{ApiClient, ApiMode};
use serde_json::Value;

pub const SERVICE: &str = "https://api.test/v1";
pub const JSON: &str = "fixtures";

#[derive(Clone)]
#[allow(dead_code)]
pub enum Reply {
    Json(Value),
    Status(u16),
    /// Never completes unless the request is cancelled.
    Hang,
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    routes: HashMap<String, Reply>,
    sent: Vec<(Method, String, Option<Value>)>,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, target: &str, reply: Reply) -> Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(target.to_string(), reply);
        self
    }

    pub fn sent(&self) -> Vec<(Method, String, Option<Value>)> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn client(&self, mode: ApiMode) -> ApiClient {
        ApiClient::builder()
            .mode(mode)
            .service_base(SERVICE)
            .json_base(JSON)
            .transport(self.clone())
            .build()
            .unwrap()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let target = request.target.to_string();
        let reply = {
            let mut state = self.state.lock().unwrap();
            state
                .sent
                .push((request.method, target.clone(), request.body.clone()));
            state.routes.get(&target).cloned()
        };
        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(status)) => Err(ApiError::http(status, "scripted failure")),
            Some(Reply::Hang) => match request.cancel {
                Some(token) => {
                    token.cancelled().await;
                    Err(ApiError::Aborted)
                }
                None => std::future::pending().await,
            },
            None => Err(ApiError::http(404, format!("no route for {}", target))),
        }
    }
}
