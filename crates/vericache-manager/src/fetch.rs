//! The caller-supplied fetch fallback, registered by name rather than
//! passed as a bare closure so warming tasks can reference it by ID and
//! stay serializable/restartable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

/// Identifies a registered [`FetchFn`] implementation.
pub type FetcherId = String;

/// Context passed to a [`FetchFn`] invocation.
#[derive(Debug, Clone)]
pub struct FetchContext {
    /// The cache key the fetch is for.
    pub key: String,
    /// The kind of key being fetched, e.g. `"verdict"`, `"team_membership"`.
    pub key_type: String,
}

/// A caller-supplied function that produces an authoritative value for a
/// key when every tier misses. Registered by name in a [`FetcherRegistry`]
/// rather than held as a closure, so a `WarmingTask`'s `fetcher_ref` can
/// name it without capturing non-serializable state.
#[async_trait]
pub trait FetchFn: Send + Sync {
    /// Produces a value for `ctx`, or `Ok(None)` if none exists.
    async fn call(&self, ctx: &FetchContext) -> Result<Option<Vec<u8>>, String>;
}

/// Maps [`FetcherId`]s to the [`FetchFn`] implementation that handles them.
#[derive(Default, Clone)]
pub struct FetcherRegistry {
    fetchers: HashMap<FetcherId, Arc<dyn FetchFn>>,
}

impl FetcherRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `fetcher` under `id`, replacing any previous registration.
    pub fn register(&mut self, id: impl Into<FetcherId>, fetcher: Arc<dyn FetchFn>) {
        self.fetchers.insert(id.into(), fetcher);
    }

    /// Looks up the fetcher registered under `id`.
    pub fn get(&self, id: &str) -> Option<Arc<dyn FetchFn>> {
        self.fetchers.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl FetchFn for Echo {
        async fn call(&self, ctx: &FetchContext) -> Result<Option<Vec<u8>>, String> {
            Ok(Some(ctx.key.clone().into_bytes()))
        }
    }

    #[tokio::test]
    async fn registered_fetcher_is_retrievable_and_callable() {
        let mut registry = FetcherRegistry::new();
        registry.register("echo", Arc::new(Echo));

        let fetcher = registry.get("echo").expect("fetcher registered");
        let ctx = FetchContext {
            key: "k1".to_string(),
            key_type: "verdict".to_string(),
        };
        let result = fetcher.call(&ctx).await.unwrap();
        assert_eq!(result, Some(b"k1".to_vec()));
    }

    #[test]
    fn unknown_fetcher_id_returns_none() {
        let registry = FetcherRegistry::new();
        assert!(registry.get("missing").is_none());
    }
}
