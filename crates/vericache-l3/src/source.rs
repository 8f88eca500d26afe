//! The read-only projection source trait L3 reads through.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::L3Error;

/// Equality filter over projection row attributes, e.g.
/// `{"team_id": "42"}` to narrow "recent authorization verdicts" to one
/// team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter(pub BTreeMap<String, String>);

impl Filter {
    /// Returns a filter matching any row.
    pub fn any() -> Self {
        Self::default()
    }

    /// Returns true if `attributes` satisfies every constraint this filter
    /// carries.
    pub fn matches(&self, attributes: &BTreeMap<String, String>) -> bool {
        self.0
            .iter()
            .all(|(key, value)| attributes.get(key) == Some(value))
    }
}

/// One row of a materialized projection.
#[derive(Debug, Clone)]
pub struct ProjectionRow {
    /// Row identifier within the projection.
    pub key: String,
    /// Opaque payload, encoded by `vericache_core::serializer`.
    pub payload: Vec<u8>,
    /// Attributes available for filtering without decoding `payload`.
    pub attributes: BTreeMap<String, String>,
}

/// A read-only materialized projection the slow path maintains, e.g. "recent
/// authorization verdicts" or "team membership snapshot". Consulted only on
/// a total miss through L1 and L2 (component C6).
#[async_trait]
pub trait ProjectionSource: Send + Sync {
    /// Returns up to `limit` rows matching `filter`.
    async fn fetch(&self, filter: &Filter, limit: usize) -> Result<Vec<ProjectionRow>, L3Error>;

    /// Asks the source to refresh its materialized state. Best-effort: the
    /// source may no-op if it is already current or refreshed externally.
    async fn refresh(&self) -> Result<(), L3Error>;
}

/// A fixed, in-memory `ProjectionSource` used for tests and local
/// development.
pub struct StaticProjectionSource {
    rows: Vec<ProjectionRow>,
}

impl StaticProjectionSource {
    /// Creates a source over a fixed set of rows.
    pub fn new(rows: Vec<ProjectionRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl ProjectionSource for StaticProjectionSource {
    async fn fetch(&self, filter: &Filter, limit: usize) -> Result<Vec<ProjectionRow>, L3Error> {
        Ok(self
            .rows
            .iter()
            .filter(|row| filter.matches(&row.attributes))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn refresh(&self) -> Result<(), L3Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, team: &str) -> ProjectionRow {
        let mut attributes = BTreeMap::new();
        attributes.insert("team_id".to_string(), team.to_string());
        ProjectionRow {
            key: key.to_string(),
            payload: Vec::new(),
            attributes,
        }
    }

    #[tokio::test]
    async fn fetch_applies_filter_and_limit() {
        let source = StaticProjectionSource::new(vec![
            row("r1", "42"),
            row("r2", "42"),
            row("r3", "7"),
        ]);

        let mut constraints = BTreeMap::new();
        constraints.insert("team_id".to_string(), "42".to_string());
        let filter = Filter(constraints);

        let rows = source.fetch(&filter, 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "r1");
    }

    #[tokio::test]
    async fn any_filter_matches_every_row() {
        let source = StaticProjectionSource::new(vec![row("r1", "42"), row("r2", "7")]);
        let rows = source.fetch(&Filter::any(), 10).await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
