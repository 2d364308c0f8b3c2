/// Account linking: attach a provider's reported identity to a canonical
/// user, creating the user on first contact with a primary registration
/// provider.
use crate::error::Result;
use crate::models::{
    Credential, IdentityKind, ProfileInfo, Provider, ProviderIdentity, TokenPair, User,
};
use crate::store::IdentityStore;
use std::sync::Arc;

/// A user together with its freshly reloaded credential rows, so callers
/// observe up-to-date state after a link.
#[derive(Debug, Clone)]
pub struct LinkedAccount {
    pub user: User,
    pub identities: Vec<Credential>,
}

pub struct AccountLinker {
    store: Arc<dyn IdentityStore>,
}

impl AccountLinker {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Link a provider identity to a user, creating whatever is missing.
    ///
    /// - Already linked to this provider: degenerates to a token update on
    ///   the existing credential row.
    /// - Identity matches a user linked through a different provider: a new
    ///   credential row is added for this provider.
    /// - No user at all: user and first credential are created in one
    ///   all-or-nothing store operation.
    ///
    /// Store failures surface unchanged; a user without a credential is
    /// never observably persisted.
    pub async fn link_or_create(
        &self,
        provider: Provider,
        identity: &ProviderIdentity,
        profile: &ProfileInfo,
        tokens: &TokenPair,
    ) -> Result<LinkedAccount> {
        let provider_id = match provider.identity_kind() {
            IdentityKind::ProviderId => Some(identity.as_str()),
            IdentityKind::Email => None,
        };

        let user = match self
            .store
            .find_user_by_provider_identity(provider, identity.as_str())
            .await?
        {
            Some(user) => {
                match self.store.find_credential(user.id, provider).await? {
                    Some(existing) => {
                        // Providers that return no refresh token on relink
                        // (Google re-consent) must not null the stored one;
                        // both fields still land in a single write.
                        let refresh_token = tokens
                            .refresh_token
                            .as_deref()
                            .or(existing.provider_refresh_token.as_deref());
                        self.store
                            .update_credential_tokens(
                                user.id,
                                provider,
                                &tokens.token,
                                refresh_token,
                            )
                            .await?;
                    }
                    None => {
                        // Known user, first time through this provider.
                        self.store
                            .insert_credential(user.id, provider, provider_id, tokens)
                            .await?;
                    }
                }
                user
            }
            None => {
                let handle = profile.derive_handle();
                let user = self
                    .store
                    .create_user_with_credential(profile, &handle, provider, provider_id, tokens)
                    .await?;
                tracing::info!(
                    provider = provider.as_str(),
                    user_id = %user.id,
                    "registered new user from provider identity"
                );
                user
            }
        };

        self.reload(user).await
    }

    async fn reload(&self, user: User) -> Result<LinkedAccount> {
        let fresh = self.store.find_user(user.id).await?.unwrap_or(user);
        let identities = self.store.list_credentials(fresh.id).await?;
        Ok(LinkedAccount {
            user: fresh,
            identities,
        })
    }
}
