//! Domain-shaped results returned by the authorization cache facade (C12).

use vericache_manager::Source;

/// Which tier served a resolved authorization result, for audit purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedBy {
    L1,
    L2,
    L3,
    Fallback,
    Miss,
}

impl From<Source> for ServedBy {
    fn from(source: Source) -> Self {
        match source {
            Source::L1 => ServedBy::L1,
            Source::L2 => ServedBy::L2,
            Source::L3 => ServedBy::L3,
            Source::Fallback => ServedBy::Fallback,
            Source::Miss => ServedBy::Miss,
        }
    }
}

/// Records which tier served a resolved authorization result and how long
/// it took, for callers that need to justify an access decision after the
/// fact.
#[derive(Debug, Clone, Copy)]
pub struct AuditTrail {
    pub served_by: ServedBy,
    pub latency_ms: u64,
}

/// A resolved set of permissions over a generation's media.
#[derive(Debug, Clone, Copy)]
pub struct Permissions {
    pub can_read: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_download: bool,
    pub can_share: bool,
    pub audit: AuditTrail,
}

impl Permissions {
    /// No permissions at all, e.g. on a total miss with no fallback result.
    pub fn none(audit: AuditTrail) -> Self {
        Self {
            can_read: false,
            can_edit: false,
            can_delete: false,
            can_download: false,
            can_share: false,
            audit,
        }
    }
}

/// A resolved team-scoped access result.
#[derive(Debug, Clone, Copy)]
pub struct TeamAccess {
    pub has_role: bool,
    pub audit: AuditTrail,
}
