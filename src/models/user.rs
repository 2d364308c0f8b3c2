use chrono::{DateTime, Utc};
/// User model
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Unique case-insensitively when present. Id-keyed providers can
    /// register users without one.
    pub email: Option<String>,
    pub handle: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    /// One-way hash of the generated stream key; the raw key is never stored.
    pub stream_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile data supplied by the OAuth callback layer, already parsed from the
/// provider's payload.
#[derive(Debug, Clone, Default)]
pub struct ProfileInfo {
    pub email: Option<String>,
    pub handle: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileInfo {
    /// Handle to register under: the suggested handle, else the email local
    /// part with separators flattened, else a generated fallback.
    pub fn derive_handle(&self) -> String {
        if let Some(handle) = &self.handle {
            if !handle.is_empty() {
                return handle.clone();
            }
        }
        match &self.email {
            Some(email) => email
                .split('@')
                .next()
                .unwrap_or("user")
                .replace(['.', '+'], "_"),
            None => format!("user_{}", &Uuid::new_v4().simple().to_string()[..8]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_handle_prefers_explicit_handle() {
        let profile = ProfileInfo {
            email: Some("alice@example.com".into()),
            handle: Some("alice_streams".into()),
            ..Default::default()
        };
        assert_eq!(profile.derive_handle(), "alice_streams");
    }

    #[test]
    fn derive_handle_falls_back_to_email_local_part() {
        let profile = ProfileInfo {
            email: Some("alice.b+test@example.com".into()),
            ..Default::default()
        };
        assert_eq!(profile.derive_handle(), "alice_b_test");
    }

    #[test]
    fn derive_handle_without_email_is_generated() {
        let profile = ProfileInfo::default();
        let handle = profile.derive_handle();
        assert!(handle.starts_with("user_"));
        assert_eq!(handle.len(), "user_".len() + 8);
    }
}
