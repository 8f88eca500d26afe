//! Named registry of [`ProjectionSource`]s, exposing `FetchProjection` and
//! `RefreshProjection` over whichever one a caller names.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::L3Error;
use crate::source::{Filter, ProjectionRow, ProjectionSource};

/// Read-only access to every registered projection (component C6).
#[derive(Default)]
pub struct ProjectionReader {
    sources: HashMap<String, Arc<dyn ProjectionSource>>,
}

impl ProjectionReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source` under `name`.
    pub fn register(&mut self, name: impl Into<String>, source: Arc<dyn ProjectionSource>) {
        self.sources.insert(name.into(), source);
    }

    /// Fetches up to `limit` rows from the projection named `name` matching
    /// `filter`.
    pub async fn fetch_projection(
        &self,
        name: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<ProjectionRow>, L3Error> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| L3Error::UnknownProjection(name.to_string()))?;
        source.fetch(filter, limit).await
    }

    /// Asks the projection named `name` to refresh.
    pub async fn refresh_projection(&self, name: &str) -> Result<(), L3Error> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| L3Error::UnknownProjection(name.to_string()))?;
        source.refresh().await
    }

    /// Returns true if every registered source's `refresh` succeeds, for
    /// `Health()`'s per-tier report. A reader with no registered sources is
    /// vacuously reachable.
    pub async fn is_reachable(&self) -> bool {
        for source in self.sources.values() {
            if source.refresh().await.is_err() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticProjectionSource;

    #[tokio::test]
    async fn fetch_on_unknown_projection_errors() {
        let reader = ProjectionReader::new();
        let err = reader
            .fetch_projection("verdicts", &Filter::any(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, L3Error::UnknownProjection(name) if name == "verdicts"));
    }

    #[tokio::test]
    async fn fetch_on_registered_projection_delegates() {
        let mut reader = ProjectionReader::new();
        reader.register(
            "verdicts",
            Arc::new(StaticProjectionSource::new(vec![ProjectionRow {
                key: "r1".to_string(),
                payload: vec![1],
                attributes: Default::default(),
            }])),
        );

        let rows = reader
            .fetch_projection("verdicts", &Filter::any(), 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn reader_with_no_sources_is_reachable() {
        let reader = ProjectionReader::new();
        assert!(reader.is_reachable().await);
    }

    #[tokio::test]
    async fn reader_is_reachable_when_every_source_refreshes_cleanly() {
        let mut reader = ProjectionReader::new();
        reader.register("verdicts", Arc::new(StaticProjectionSource::new(Vec::new())));
        assert!(reader.is_reachable().await);
    }
}
