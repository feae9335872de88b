//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use record_service::config::{NameSource, ServiceConfig};
use record_service::{AppState, HttpServer, Listing, NameGenerator, Record, RecordStore, StoreError};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// In-memory [RecordStore] with the same id semantics as a serial column.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    last_id: i32,
    rows: Vec<Record>,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, name: &str) -> Result<Record, StoreError> {
        let mut state = self.inner.lock().unwrap();
        state.last_id += 1;
        let record = Record {
            id: state.last_id,
            name: name.to_string(),
        };
        state.rows.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Listing, StoreError> {
        let state = self.inner.lock().unwrap();
        Ok(Listing {
            names: state.rows.iter().rev().map(|r| Some(r.name.clone())).collect(),
        })
    }

    async fn clean(&self) -> Result<u64, StoreError> {
        let mut state = self.inner.lock().unwrap();
        let removed = state.rows.len() as u64;
        state.rows.clear();
        Ok(removed)
    }
}

/// A store whose every operation fails.
#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn insert(&self, _name: &str) -> Result<Record, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn list(&self) -> Result<Listing, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn clean(&self) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// A store that takes `delay` to answer every call.
#[allow(dead_code)]
pub struct SlowStore {
    pub delay: Duration,
}

#[async_trait]
impl RecordStore for SlowStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, name: &str) -> Result<Record, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(Record {
            id: 1,
            name: name.to_string(),
        })
    }

    async fn list(&self) -> Result<Listing, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(Listing::default())
    }

    async fn clean(&self) -> Result<u64, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(0)
    }
}

/// Build a server over `store` with the given config.
#[allow(dead_code)]
pub fn server_with(config: &ServiceConfig, store: Arc<dyn RecordStore>) -> HttpServer {
    let state = AppState::new(store, NameGenerator::new(config.records.name_source));
    HttpServer::new(config, state)
}

/// Router over a fresh in-memory store with default settings.
#[allow(dead_code)]
pub fn memory_router() -> Router {
    server_with(&ServiceConfig::default(), Arc::new(MemoryStore::default())).router()
}

#[allow(dead_code)]
pub fn config_with_names(source: NameSource) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.records.name_source = source;
    config
}

/// Response pieces from a routed request.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

/// Send a GET through the router without a socket.
#[allow(dead_code)]
pub async fn get(router: &Router, path: &str) -> TestResponse {
    send(router, Request::builder().uri(path).body(Body::empty()).unwrap()).await
}

#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    TestResponse {
        status,
        headers,
        json,
    }
}

/// Bind an ephemeral local port.
#[allow(dead_code)]
pub async fn local_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}
