/// Provider client capability: the network half of token refresh.
///
/// One implementation per provider, resolved through [`ProviderRegistry`]
/// rather than string dispatch.
pub mod github;
pub mod google;
pub mod restream;

use crate::config::ProviderConfig;
use crate::error::{IdentityError, RefreshError, Result};
use crate::models::{Provider, TokenPair};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub use github::GithubClient;
pub use google::GoogleClient;
pub use restream::RestreamClient;

#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Exchange a stored refresh token for a fresh access/refresh pair.
    /// Pure network call, no storage access.
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<TokenPair, RefreshError>;
}

/// Capability table mapping each [`Provider`] to its client.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    clients: HashMap<Provider, Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    /// Build clients for every provider whose credentials are configured.
    /// Asking for an unconfigured provider later is a `Config` error, not a
    /// panic.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let http = reqwest::Client::new();
        let mut registry = Self::default();

        if let (Some(id), Some(secret)) = (&config.github_client_id, &config.github_client_secret)
        {
            registry.insert(
                Provider::Github,
                Arc::new(GithubClient::new(http.clone(), id.clone(), secret.clone())),
            );
        }
        if let (Some(id), Some(secret)) = (&config.google_client_id, &config.google_client_secret)
        {
            registry.insert(
                Provider::Google,
                Arc::new(GoogleClient::new(http.clone(), id.clone(), secret.clone())),
            );
        }
        if let (Some(id), Some(secret)) =
            (&config.restream_client_id, &config.restream_client_secret)
        {
            registry.insert(
                Provider::Restream,
                Arc::new(RestreamClient::new(http, id.clone(), secret.clone())),
            );
        }

        registry
    }

    pub fn insert(&mut self, provider: Provider, client: Arc<dyn ProviderClient>) {
        self.clients.insert(provider, client);
    }

    pub fn client_for(&self, provider: Provider) -> Result<Arc<dyn ProviderClient>> {
        self.clients.get(&provider).cloned().ok_or_else(|| {
            IdentityError::Config(format!("{} client not configured", provider.as_str()))
        })
    }
}
