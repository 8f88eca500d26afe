//! The authorization cache facade (component C12): a domain-shaped API
//! atop the cache manager so the rest of the process never speaks in raw
//! keys.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vericache_core::{CacheObserver, Clock};
use vericache_learner::AccessPatternLearner;
use vericache_manager::{CacheManager, FetchFn, Source};

use crate::error::CacheError;
use crate::permissions::{AuditTrail, Permissions, ServedBy, TeamAccess};

/// Resolved `(l1_ttl, l2_ttl)` for a key kind, per the TTL-by-key-kind
/// table. Falls back to `(300s, 300s)` for an unrecognized kind.
fn ttl_for_key_kind(key_type: &str) -> (Duration, Duration) {
    let secs = match key_type {
        "direct_ownership" => 900,
        "team_membership" => 600,
        "generation_access" => 300,
        "user_profile" => 1800,
        "project_visibility" => 1200,
        _ => 300,
    };
    (Duration::from_secs(secs), Duration::from_secs(secs))
}

/// Eviction priority (0-10) for a key kind. Direct ownership is the
/// highest-priority cacheable predicate and gets the longest-lived slot.
fn priority_for_key_kind(key_type: &str) -> u8 {
    match key_type {
        "direct_ownership" => 8,
        _ => 5,
    }
}

fn tags_for(user_id: &str, resource_id: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    tags.insert(format!("user:{user_id}"));
    tags.insert(format!("resource:{resource_id}"));
    tags
}

#[derive(Debug, Serialize, Deserialize)]
struct MediaAccessBits {
    read: bool,
    edit: bool,
    delete: bool,
    download: bool,
    share: bool,
}

/// Domain-shaped API over a [`CacheManager`]: composes keys, records access
/// patterns, and reports end-to-end latency to the performance monitor.
pub struct AuthorizationCacheFacade {
    manager: Arc<CacheManager>,
    learner: Arc<AccessPatternLearner>,
    observer: Arc<dyn CacheObserver>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationCacheFacade {
    pub(crate) fn new(
        manager: Arc<CacheManager>,
        learner: Arc<AccessPatternLearner>,
        observer: Arc<dyn CacheObserver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            manager,
            learner,
            observer,
            clock,
        }
    }

    /// Resolves `user_id`'s permissions over `generation_id`'s media.
    pub async fn resolve_media_access(
        &self,
        generation_id: &str,
        user_id: &str,
        fallback: Option<Arc<dyn FetchFn>>,
    ) -> Result<Permissions, CacheError> {
        let cache_key = format!("auth:generation:{user_id}:{generation_id}:media");
        let tags = tags_for(user_id, generation_id);
        let (value, served_by, latency_ms) = self
            .resolve(&cache_key, "generation_access", user_id, "resolve_media_access", fallback, tags)
            .await?;

        let audit = AuditTrail { served_by, latency_ms };
        match value {
            Some(bytes) => {
                let bits: MediaAccessBits = vericache_core::decode(&bytes)?;
                Ok(Permissions {
                    can_read: bits.read,
                    can_edit: bits.edit,
                    can_delete: bits.delete,
                    can_download: bits.download,
                    can_share: bits.share,
                    audit,
                })
            }
            None => Ok(Permissions::none(audit)),
        }
    }

    /// Resolves whether `user_id` holds `required_role` over `resource_id`.
    pub async fn resolve_team_access(
        &self,
        resource_id: &str,
        user_id: &str,
        required_role: &str,
        fallback: Option<Arc<dyn FetchFn>>,
    ) -> Result<TeamAccess, CacheError> {
        let cache_key = format!("auth:team:{resource_id}:{user_id}:{required_role}");
        let tags = tags_for(user_id, resource_id);
        let (value, served_by, latency_ms) = self
            .resolve(&cache_key, "team_membership", user_id, "resolve_team_access", fallback, tags)
            .await?;

        let has_role = match value {
            Some(bytes) => vericache_core::decode(&bytes)?,
            None => false,
        };
        Ok(TeamAccess {
            has_role,
            audit: AuditTrail { served_by, latency_ms },
        })
    }

    /// Resolves whether `user_id` directly owns the resource identified by
    /// `owner_id` within `context`. Highest-priority cacheable predicate;
    /// longest TTL.
    pub async fn resolve_direct_ownership(
        &self,
        owner_id: &str,
        user_id: &str,
        context: &str,
        fallback: Option<Arc<dyn FetchFn>>,
    ) -> Result<bool, CacheError> {
        let cache_key = format!("auth:ownership:{owner_id}:{user_id}:{context}");
        let tags = tags_for(user_id, owner_id);
        let (value, _served_by, _latency_ms) = self
            .resolve(&cache_key, "direct_ownership", user_id, "resolve_direct_ownership", fallback, tags)
            .await?;

        match value {
            Some(bytes) => Ok(vericache_core::decode(&bytes)?),
            None => Ok(false),
        }
    }

    /// One-shot convenience that seeds the warming orchestrator with the
    /// default warming pattern set, outside its own background schedule.
    pub async fn warm_frequent(&self) {
        self.manager.warm_now().await;
    }

    /// Invalidates every cached authorization result for `user_id`.
    pub async fn invalidate_user(&self, user_id: &str) {
        self.manager.invalidate_by_tag(&format!("user:{user_id}")).await;
    }

    /// Invalidates every cached authorization result touching `resource_id`.
    pub async fn invalidate_resource(&self, resource_id: &str) {
        self.manager.invalidate_by_tag(&format!("resource:{resource_id}")).await;
    }

    async fn resolve(
        &self,
        cache_key: &str,
        key_type: &str,
        user_id: &str,
        operation: &str,
        fallback: Option<Arc<dyn FetchFn>>,
        tags: BTreeSet<String>,
    ) -> Result<(Option<Vec<u8>>, ServedBy, u64), CacheError> {
        let started = self.clock.now();
        let (value, source) = self.manager.get(cache_key, key_type, fallback).await?;

        if matches!(source, Source::Fallback | Source::L3) {
            if let Some(payload) = value.clone() {
                let (l1_ttl, l2_ttl) = ttl_for_key_kind(key_type);
                self.manager
                    .set(
                        cache_key,
                        payload,
                        Some(l1_ttl),
                        Some(l2_ttl),
                        priority_for_key_kind(key_type),
                        tags,
                    )
                    .await;
            }
        }

        let latency_ms = self.clock.now().duration_since(started).as_millis() as u64;
        self.observer.observe_facade(latency_ms);
        self.learner.record_access(user_id, key_type, operation, "facade");

        Ok((value, source.into(), latency_ms))
    }
}
