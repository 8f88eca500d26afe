//! The breaker-guarded, namespaced, deadline-bound RPC client (component C5).

use std::sync::Arc;

use vericache_circuitbreaker::Circuit;
use vericache_core::Clock;

use crate::backend::{BackendInfo, RemoteBackend};
use crate::config::L2Config;
use crate::error::L2Error;

/// Adapts a [`RemoteBackend`] into vericache's L2 tier: every call is
/// namespaced, breaker-guarded, and bounded by a deadline.
pub struct L2Adapter {
    config: L2Config,
    backend: Arc<dyn RemoteBackend>,
    circuit: Circuit,
    clock: Arc<dyn Clock>,
}

impl L2Adapter {
    /// Creates a new adapter over `backend`.
    pub fn new(config: L2Config, backend: Arc<dyn RemoteBackend>, clock: Arc<dyn Clock>) -> Self {
        let circuit = Circuit::new(config.breaker.clone(), Arc::clone(&clock));
        Self {
            config,
            backend,
            circuit,
            clock,
        }
    }

    /// Returns the circuit breaker guarding this adapter's calls, so callers
    /// can register listeners or inspect state.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Fetches the value stored under `key` (unnamespaced). Returns
    /// `Ok(None)` on a clean miss.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, L2Error> {
        self.guarded(|backend, namespaced| async move {
            backend
                .get(&namespaced)
                .await
                .map_err(|e| L2Error::Backend(e.0))
        }, key)
        .await
    }

    /// Stores `value` under `key`, expiring after `ttl_secs` if set.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: Option<u64>) -> Result<(), L2Error> {
        self.guarded(
            |backend, namespaced| async move {
                backend
                    .set(&namespaced, value, ttl_secs)
                    .await
                    .map_err(|e| L2Error::Backend(e.0))
            },
            key,
        )
        .await
    }

    /// Deletes `key`.
    pub async fn delete(&self, key: &str) -> Result<(), L2Error> {
        self.guarded(
            |backend, namespaced| async move {
                backend
                    .delete(&namespaced)
                    .await
                    .map_err(|e| L2Error::Backend(e.0))
            },
            key,
        )
        .await
    }

    /// Deletes every key matching `pattern` (already namespaced by the
    /// caller, or a bare `*` suffix over the adapter's prefix). Scans in
    /// pages via [`RemoteBackend::scan`] so this O(N) invalidation never
    /// blocks other calls on a single round trip.
    pub async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, L2Error> {
        let namespaced_pattern = format!("{}{}", self.config.key_prefix, pattern);
        let mut deleted = 0u64;
        let mut cursor = None;

        loop {
            let page = self
                .run_with_deadline(self.backend.scan(&namespaced_pattern, cursor.clone()))
                .await
                .map_err(|e| {
                    self.circuit.on_failure();
                    e
                })?;
            self.circuit.on_success();

            for key in &page.keys {
                self.run_with_deadline(self.backend.delete(key))
                    .await
                    .map_err(|e| {
                        self.circuit.on_failure();
                        e
                    })?;
                self.circuit.on_success();
                deleted += 1;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(deleted)
    }

    /// Checks reachability.
    pub async fn ping(&self) -> Result<(), L2Error> {
        self.circuit.allow()?;
        let result = self.run_with_deadline(self.backend.ping()).await;
        self.record_outcome(&result);
        result
    }

    /// Returns backend diagnostic info.
    pub async fn info(&self) -> Result<BackendInfo, L2Error> {
        self.circuit.allow()?;
        let result = self.run_with_deadline(self.backend.info()).await;
        self.record_outcome(&result);
        result
    }

    async fn guarded<F, Fut, T>(&self, op: F, key: &str) -> Result<T, L2Error>
    where
        F: FnOnce(Arc<dyn RemoteBackend>, String) -> Fut,
        Fut: std::future::Future<Output = Result<T, L2Error>>,
    {
        self.circuit.allow()?;
        let namespaced = format!("{}{}", self.config.key_prefix, key);
        let result = self
            .run_with_deadline(op(Arc::clone(&self.backend), namespaced))
            .await;
        self.record_outcome(&result);
        result
    }

    async fn run_with_deadline<Fut, T>(&self, fut: Fut) -> Result<T, L2Error>
    where
        Fut: std::future::Future<Output = Result<T, L2Error>>,
    {
        match tokio::time::timeout(self.config.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(L2Error::Timeout {
                deadline_ms: self.config.deadline.as_millis() as u64,
            }),
        }
    }

    fn record_outcome<T>(&self, result: &Result<T, L2Error>) {
        let _ = self.clock.now();
        match result {
            Ok(_) => self.circuit.on_success(),
            Err(err) if err.trips_breaker() => self.circuit.on_failure(),
            Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryRemote;
    use vericache_core::TestClock;

    fn adapter() -> L2Adapter {
        let clock = Arc::new(TestClock::default());
        let backend = Arc::new(InMemoryRemote::new(move || 1_000));
        L2Adapter::new(L2Config::default(), backend, clock)
    }

    #[tokio::test]
    async fn namespaced_set_then_get_round_trips() {
        let adapter = adapter();
        adapter.set("k1", vec![9, 9], None).await.unwrap();
        assert_eq!(adapter.get("k1").await.unwrap(), Some(vec![9, 9]));
    }

    #[tokio::test]
    async fn missing_key_returns_none_not_an_error() {
        let adapter = adapter();
        assert_eq!(adapter.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn breaker_trips_after_repeated_backend_failures() {
        struct AlwaysFails;

        #[async_trait::async_trait]
        impl RemoteBackend for AlwaysFails {
            async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, crate::backend::BackendError> {
                Err(crate::backend::BackendError("down".to_string()))
            }
            async fn set(
                &self,
                _key: &str,
                _value: Vec<u8>,
                _ttl_secs: Option<u64>,
            ) -> Result<(), crate::backend::BackendError> {
                Err(crate::backend::BackendError("down".to_string()))
            }
            async fn delete(&self, _key: &str) -> Result<(), crate::backend::BackendError> {
                Err(crate::backend::BackendError("down".to_string()))
            }
            async fn scan(
                &self,
                _pattern: &str,
                _cursor: Option<String>,
            ) -> Result<crate::backend::ScanPage, crate::backend::BackendError> {
                Err(crate::backend::BackendError("down".to_string()))
            }
            async fn ping(&self) -> Result<(), crate::backend::BackendError> {
                Err(crate::backend::BackendError("down".to_string()))
            }
            async fn info(&self) -> Result<crate::backend::BackendInfo, crate::backend::BackendError> {
                Err(crate::backend::BackendError("down".to_string()))
            }
        }

        let mut config = L2Config::default();
        config.breaker.failure_threshold = 2;
        let clock = Arc::new(TestClock::default());
        let adapter = L2Adapter::new(config, Arc::new(AlwaysFails), clock);

        let _ = adapter.get("k1").await;
        let _ = adapter.get("k2").await;

        let err = adapter.get("k3").await.unwrap_err();
        assert!(matches!(err, L2Error::Breaker(_)));
    }

    #[tokio::test]
    async fn delete_by_pattern_removes_every_matching_key() {
        let clock = Arc::new(TestClock::default());
        let backend = Arc::new(InMemoryRemote::new(|| 1_000));
        let config = L2Config {
            key_prefix: String::new(),
            ..L2Config::default()
        };
        let adapter = L2Adapter::new(config, backend.clone(), clock);

        adapter.set("team:1", vec![1], None).await.unwrap();
        adapter.set("team:2", vec![2], None).await.unwrap();
        adapter.set("user:1", vec![3], None).await.unwrap();

        let deleted = adapter.delete_by_pattern("team:*").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(adapter.get("user:1").await.unwrap(), Some(vec![3]));
    }
}
