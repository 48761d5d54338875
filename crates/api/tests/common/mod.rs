#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use opsview_cache::{CacheError, CacheStore, MemoryCache};
use opsview_core::event::NewEvent;
use opsview_core::types::DbId;
use opsview_db::EventStore;
use tower::ServiceExt;

use opsview_api::config::ServerConfig;
use opsview_api::metrics::Metrics;
use opsview_api::router::build_app_router;
use opsview_api::services::StatsService;
use opsview_api::state::AppState;

/// In-memory event log that can be switched to "unreachable".
#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<Vec<NewEvent>>,
    unavailable: AtomicBool,
    count_calls: AtomicUsize,
}

impl MemoryEventStore {
    /// Append events directly, bypassing the service (and its invalidation).
    pub fn seed(&self, n: usize) {
        let mut events = self.events.lock().unwrap();
        for i in 0..n {
            events.push(
                NewEvent::from_parts(Some(format!("seed-{i}")), Some(serde_json::json!({})))
                    .unwrap(),
            );
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<NewEvent> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// How many times the count query ran.
    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn count_events(&self) -> Result<i64, sqlx::Error> {
        self.check()?;
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.len() as i64)
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<DbId, sqlx::Error> {
        self.check()?;
        let mut events = self.events.lock().unwrap();
        events.push(event.clone());
        Ok(events.len() as DbId)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.check()
    }
}

/// A cache whose every operation fails.
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn del(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and the default 10-second stats TTL.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        redis_url: None,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        stats_cache_ttl_secs: 10,
        cache_timeout_ms: 500,
    }
}

/// Everything a test needs to drive the app and inspect its collaborators.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryEventStore>,
    pub metrics: Arc<Metrics>,
}

/// Full application router over an in-memory store and the given cache.
pub fn build_test_app_with_cache(cache: Arc<dyn CacheStore>) -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryEventStore::default());
    let metrics = Arc::new(Metrics::new().unwrap());

    let stats = Arc::new(StatsService::new(
        store.clone(),
        cache,
        Arc::clone(&metrics),
        config.stats_cache_ttl(),
    ));
    let state = AppState {
        stats,
        metrics: Arc::clone(&metrics),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        metrics,
    }
}

/// Full application router over an in-memory store and in-memory cache.
pub fn build_test_app() -> (TestApp, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let app = build_test_app_with_cache(cache.clone());
    (app, cache)
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, &body.to_string()).await
}

pub async fn post_raw(app: &TestApp, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
