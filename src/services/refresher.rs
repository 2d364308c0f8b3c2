/// Provider token refresh
///
/// Policy: every read through `get_live_token` performs a refresh before
/// returning. No expiry bookkeeping, one extra round trip per read, and a
/// token known to be expired is never served.
use crate::error::{RefreshError, Result};
use crate::models::{Provider, TokenPair};
use crate::providers::ProviderRegistry;
use crate::store::IdentityStore;
use std::sync::Arc;
use uuid::Uuid;

pub struct TokenRefresher {
    store: Arc<dyn IdentityStore>,
    providers: ProviderRegistry,
}

impl TokenRefresher {
    pub fn new(store: Arc<dyn IdentityStore>, providers: ProviderRegistry) -> Self {
        Self { store, providers }
    }

    /// Exchange a refresh token with the provider. Pure delegation through
    /// the capability table; no store access.
    pub async fn refresh(&self, provider: Provider, refresh_token: &str) -> Result<TokenPair> {
        let client = self.providers.client_for(provider)?;
        Ok(client.exchange_refresh_token(refresh_token).await?)
    }

    /// Return a live access token for (user, provider), refreshing it first.
    ///
    /// `Ok(None)` means no credential is stored for the pair. A failed
    /// exchange surfaces as `IdentityError::ProviderRefresh`: "no live token"
    /// is a terminal outcome the caller handles, not a crash. Concurrent
    /// calls for the same pair race at the provider; the loser sees its
    /// rotated refresh token rejected and fails cleanly, it never writes a
    /// stale half back.
    pub async fn get_live_token(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<String>> {
        let Some(credential) = self.store.find_credential(user_id, provider).await? else {
            return Ok(None);
        };

        let Some(stored_refresh) = credential.provider_refresh_token.clone() else {
            return Err(RefreshError::ProviderRejected(format!(
                "no refresh token on record for {}",
                provider.as_str()
            ))
            .into());
        };

        // Refresh first, write after. No store operation is in flight while
        // the provider call is awaited.
        let pair = match self.refresh(provider, &stored_refresh).await {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(
                    provider = provider.as_str(),
                    %user_id,
                    "token refresh failed: {err}"
                );
                return Err(err);
            }
        };

        // Providers that keep the refresh token stable omit it from the
        // response; retain the stored one in that case. Both fields land in
        // a single store write either way.
        let rotated_refresh = pair
            .refresh_token
            .clone()
            .unwrap_or(stored_refresh);
        self.store
            .update_credential_tokens(user_id, provider, &pair.token, Some(&rotated_refresh))
            .await?;

        Ok(Some(pair.token))
    }
}
