use chrono::{DateTime, Utc};
/// Provider and credential models
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of external account providers. Dispatch to a provider client
/// goes through `ProviderRegistry`, resolved at compile time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Google,
    Restream,
}

/// How a provider's callback identifies the account owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// Matched against `users.email`, case-insensitively.
    Email,
    /// Matched exactly against `credentials.provider_id` for this provider.
    ProviderId,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Google => "google",
            Provider::Restream => "restream",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "github" => Some(Provider::Github),
            "google" => Some(Provider::Google),
            "restream" => Some(Provider::Restream),
            _ => None,
        }
    }

    pub fn identity_kind(&self) -> IdentityKind {
        match self {
            Provider::Github | Provider::Google => IdentityKind::Email,
            Provider::Restream => IdentityKind::ProviderId,
        }
    }
}

/// The primary identity a provider reported for the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity(pub String);

impl ProviderIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Access/refresh token pair as returned by a provider exchange. Some
/// providers (GitHub without expiring tokens enabled) return no refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: Option<String>,
}

/// Stored (user, provider) token binding. At most one row per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: Provider,
    /// External stable id; absent for providers that only report an email.
    pub provider_id: Option<String>,
    pub provider_token: String,
    pub provider_refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
