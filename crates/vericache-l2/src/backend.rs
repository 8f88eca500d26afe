//! The pluggable remote key-value backend L2 talks to.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// An error from the remote backend itself, distinct from deadline/breaker
/// failures the adapter layers on top.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct BackendError(pub String);

/// One page of a cursor-based key scan.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    /// Keys matching the scan pattern in this page.
    pub keys: Vec<String>,
    /// Opaque cursor to pass to the next `scan` call, or `None` if this was
    /// the last page.
    pub next_cursor: Option<String>,
}

/// Liveness/diagnostic info from `Info`.
#[derive(Debug, Clone, Default)]
pub struct BackendInfo {
    /// Backend-reported version string.
    pub version: String,
    /// Number of keys the backend estimates it holds.
    pub approximate_key_count: u64,
}

/// A remote key-value store L2 namespaces keys into and wraps with a
/// circuit breaker. Implementations talk to whatever is behind the wire —
/// Redis, a custom RPC service, etc.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Fetches `key`. Returns `Ok(None)` for a clean miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Stores `value` under `key`, expiring after `ttl_secs` seconds if set.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: Option<u64>) -> Result<(), BackendError>;

    /// Deletes `key`. Not an error if the key was already absent.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Returns one page of keys matching `pattern`, continuing from
    /// `cursor` if given. Used by `DeleteByPattern` to scan without
    /// blocking other calls on one O(N) operation.
    async fn scan(&self, pattern: &str, cursor: Option<String>) -> Result<ScanPage, BackendError>;

    /// Checks reachability.
    async fn ping(&self) -> Result<(), BackendError>;

    /// Returns backend diagnostic info.
    async fn info(&self) -> Result<BackendInfo, BackendError>;
}

struct StoredValue {
    bytes: Vec<u8>,
    expires_at_unix: Option<u64>,
}

/// An in-process `RemoteBackend` used for tests and local development.
/// Matches keys by glob-style `*` wildcard for `scan`.
pub struct InMemoryRemote {
    data: Mutex<HashMap<String, StoredValue>>,
    unix_now: Box<dyn Fn() -> u64 + Send + Sync>,
}

impl InMemoryRemote {
    /// Creates an empty in-memory backend. `unix_now` supplies the current
    /// Unix timestamp for TTL bookkeeping (inject `vericache_core::Clock`'s
    /// `unix_now` in production-shaped tests).
    pub fn new(unix_now: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            unix_now: Box::new(unix_now),
        }
    }

    fn is_expired(&self, value: &StoredValue) -> bool {
        match value.expires_at_unix {
            Some(expires_at) => (self.unix_now)() >= expires_at,
            None => false,
        }
    }
}

#[async_trait]
impl RemoteBackend for InMemoryRemote {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut data = self.data.lock().expect("in-memory remote mutex poisoned");
        if let Some(value) = data.get(key) {
            if self.is_expired(value) {
                data.remove(key);
                return Ok(None);
            }
            return Ok(Some(value.bytes.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: Option<u64>) -> Result<(), BackendError> {
        let mut data = self.data.lock().expect("in-memory remote mutex poisoned");
        let expires_at_unix = ttl_secs.map(|ttl| (self.unix_now)() + ttl);
        data.insert(
            key.to_string(),
            StoredValue {
                bytes: value,
                expires_at_unix,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.data
            .lock()
            .expect("in-memory remote mutex poisoned")
            .remove(key);
        Ok(())
    }

    async fn scan(&self, pattern: &str, cursor: Option<String>) -> Result<ScanPage, BackendError> {
        let data = self.data.lock().expect("in-memory remote mutex poisoned");
        let mut keys: Vec<String> = data
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();
        keys.sort();

        let start = match cursor {
            Some(cursor) => keys.iter().position(|k| k > &cursor).unwrap_or(keys.len()),
            None => 0,
        };

        Ok(ScanPage {
            keys: keys[start..].to_vec(),
            next_cursor: None,
        })
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn info(&self) -> Result<BackendInfo, BackendError> {
        let data = self.data.lock().expect("in-memory remote mutex poisoned");
        Ok(BackendInfo {
            version: "in-memory-0".to_string(),
            approximate_key_count: data.len() as u64,
        })
    }
}

fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == key,
        Some((prefix, suffix)) => key.starts_with(prefix) && key.ends_with(suffix),
    }
}
