//! Mock HTTP API, response cache and rate limiter tools

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{has, operation_of, str_arg, OperationError, OperationOutcome, OperationResult, OperationTool};

pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
pub const RATE_LIMIT_MAX_REQUESTS: usize = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

// ============================================================================
// Rate limiter
// ============================================================================

/// Sliding-window request counter keyed by an arbitrary string
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    requests: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// True when another request for `key` fits in the window
    pub async fn check(&self, key: &str) -> bool {
        let mut requests = self.requests.lock().await;
        self.prune(&mut requests, key, Instant::now()) < self.max_requests
    }

    /// Check and record in one step; false when `key` is over the limit
    pub async fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut requests = self.requests.lock().await;
        if self.prune(&mut requests, key, now) >= self.max_requests {
            return false;
        }
        requests.entry(key.to_string()).or_default().push(now);
        true
    }

    /// Drop timestamps outside the window and return how many remain.
    /// Keys with nothing left are removed.
    fn prune(&self, requests: &mut HashMap<String, Vec<Instant>>, key: &str, now: Instant) -> usize {
        let Some(timestamps) = requests.get_mut(key) else {
            return 0;
        };
        timestamps.retain(|t| now.duration_since(*t) < self.window);
        let remaining = timestamps.len();
        if remaining == 0 {
            requests.remove(key);
        }
        remaining
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_WINDOW, RATE_LIMIT_MAX_REQUESTS)
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// TTL cache; expired entries are dropped when read
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => entry.expires_at <= Instant::now(),
        };
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    /// Store `value` for `ttl`; fails when the expiry is not representable
    pub async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), OperationError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| OperationError::failed(format!("ttl of {}s is too large", ttl.as_secs())))?;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }
}

// ============================================================================
// Mock HTTP
// ============================================================================

/// Response produced by the mock HTTP backend
#[derive(Debug, Clone, Serialize)]
pub struct MockResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl MockResponse {
    fn json(status_code: u16, body: Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }
}

/// Mock request dispatcher with a per-URL rate limit
pub struct ApiTool {
    limiter: RateLimiter,
}

impl ApiTool {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }

    pub async fn make_request(&self, url: &str, method: &str) -> MockResponse {
        if !self.limiter.try_acquire(url).await {
            return MockResponse::json(429, json!({ "error": "Rate limit exceeded" }));
        }
        debug!(url = %url, method = %method, "Mock API request");

        if url.starts_with("https://api.example.com/data") {
            MockResponse::json(
                200,
                json!({
                    "data": "Sample data from API",
                    "timestamp": chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
                }),
            )
        } else if url.starts_with("https://api.example.com/users") {
            MockResponse::json(
                200,
                json!({
                    "users": [
                        { "id": 1, "name": "User 1" },
                        { "id": 2, "name": "User 2" }
                    ]
                }),
            )
        } else if url.starts_with("https://api.example.com/error") {
            MockResponse::json(500, json!({ "error": "Internal server error" }))
        } else {
            MockResponse::json(404, json!({ "error": "Not found" }))
        }
    }
}

impl Default for ApiTool {
    fn default() -> Self {
        Self::new(RateLimiter::default())
    }
}

#[async_trait]
impl OperationTool for ApiTool {
    fn name(&self) -> &str {
        "api_tool"
    }

    fn kind(&self) -> &str {
        "API"
    }

    fn description(&self) -> &str {
        "Makes mock HTTP requests to APIs. Operations: request."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["request"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "url": { "type": "string" },
            "method": { "type": "string", "description": "HTTP method (default GET)" },
            "headers": { "type": "object" },
            "data": { "description": "Request body" }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        matches!(operation_of(input), Some("request")) && has(input, "url")
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "request" => {
                let url = str_arg(input, "url")?;
                let method = input.get("method").and_then(Value::as_str).unwrap_or("GET");
                let response = self.make_request(url, method).await;
                let success = response.status_code < 400;
                let data = serde_json::to_value(&response)
                    .map_err(|e| OperationError::failed(e.to_string()))?;
                Ok(if success {
                    OperationResult::ok(data)
                } else {
                    OperationResult::unsuccessful(data)
                })
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}

pub struct CacheTool {
    cache: ResponseCache,
}

impl CacheTool {
    pub fn new(cache: ResponseCache) -> Self {
        Self { cache }
    }
}

impl Default for CacheTool {
    fn default() -> Self {
        Self::new(ResponseCache::new())
    }
}

#[async_trait]
impl OperationTool for CacheTool {
    fn name(&self) -> &str {
        "cache_tool"
    }

    fn kind(&self) -> &str {
        "cache"
    }

    fn description(&self) -> &str {
        "Manages cache for storing and retrieving data with TTL. Operations: get, set."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["get", "set"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "key": { "type": "string" },
            "value": {},
            "ttl": { "type": "integer", "description": "Seconds to live (default 3600)" }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        match operation_of(input) {
            Some("get") => has(input, "key"),
            Some("set") => has(input, "key") && has(input, "value"),
            _ => false,
        }
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "get" => {
                let key = str_arg(input, "key")?;
                Ok(OperationResult::ok(
                    self.cache.get(key).await.unwrap_or(Value::Null),
                ))
            }
            "set" => {
                let key = str_arg(input, "key")?;
                let value = input.get("value").cloned().unwrap_or(Value::Null);
                let ttl = match input.get("ttl") {
                    None | Some(Value::Null) => DEFAULT_CACHE_TTL_SECS,
                    Some(ttl) => ttl.as_u64().ok_or_else(|| {
                        OperationError::failed("'ttl' must be a non-negative integer")
                    })?,
                };
                self.cache.set(key, value, Duration::from_secs(ttl)).await?;
                Ok(OperationResult::ok(json!({ "cached": true })))
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}

pub struct RateLimiterTool {
    limiter: RateLimiter,
}

impl RateLimiterTool {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }
}

impl Default for RateLimiterTool {
    fn default() -> Self {
        Self::new(RateLimiter::default())
    }
}

#[async_trait]
impl OperationTool for RateLimiterTool {
    fn name(&self) -> &str {
        "rate_limiter_tool"
    }

    fn kind(&self) -> &str {
        "rate limiter"
    }

    fn description(&self) -> &str {
        "Manages rate limiting for API requests. Operations: check."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["check"]
    }

    fn argument_properties(&self) -> Value {
        json!({ "key": { "type": "string" } })
    }

    fn validate_input(&self, input: &Value) -> bool {
        matches!(operation_of(input), Some("check")) && has(input, "key")
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "check" => {
                let key = str_arg(input, "key")?;
                let allowed = self.limiter.check(key).await;
                Ok(OperationResult::ok(json!({ "allowed": allowed })))
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}
