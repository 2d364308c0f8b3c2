use chrono::{DateTime, Utc};
/// Entity model: a platform-scoped identity projection distinct from the
/// canonical User, used for cross-platform attribution.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique on (platform, platform_id). The handle is unique too, with a single
/// deterministic fallback on collision (see `EntityResolver`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub platform: String,
    pub platform_id: String,
    pub user_id: Uuid,
    pub handle: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    /// Opaque key/value bag; first write wins, never reconciled.
    pub platform_meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Platform reserved for entities derived directly from a local user.
pub const INTERNAL_PLATFORM: &str = "internal";

/// Insert payload for an entity; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewEntity {
    pub platform: String,
    pub platform_id: String,
    pub user_id: Uuid,
    pub handle: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub platform_meta: serde_json::Value,
}
