/// Persistence capability for the identity core.
///
/// Pure storage, no business logic. The Postgres implementation is the
/// production store; the in-memory implementation mirrors the same contract
/// (including which unique constraint a conflict names) for tests and local
/// development.
pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::{Credential, Entity, NewEntity, ProfileInfo, Provider, TokenPair, User};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Unique index on entities.handle. Conflicts here are recoverable exactly
/// once (handle fallback); conflicts on anything else are fatal.
pub const ENTITY_HANDLE_KEY: &str = "entities_handle_key";
/// Unique index on (entities.platform, entities.platform_id).
pub const ENTITY_PLATFORM_KEY: &str = "entities_platform_platform_id_key";
/// Unique index on (credentials.user_id, credentials.provider).
pub const CREDENTIAL_PAIR_KEY: &str = "credentials_user_id_provider_key";
/// Unique index on lower(users.email).
pub const USER_EMAIL_KEY: &str = "users_email_key";

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Case-insensitive email lookup.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Resolve the user a provider callback identity belongs to:
    /// case-insensitive email match for email-keyed providers, exact
    /// provider_id match (scoped to the provider) for id-keyed ones.
    async fn find_user_by_provider_identity(
        &self,
        provider: Provider,
        identity: &str,
    ) -> Result<Option<User>>;

    async fn find_credential(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<Credential>>;

    async fn list_credentials(&self, user_id: Uuid) -> Result<Vec<Credential>>;

    /// Overwrite BOTH token fields of an existing credential in one atomic
    /// point-write keyed by the (user_id, provider) unique pair. Errors
    /// `NotFound` when no row exists; creation only happens through
    /// [`insert_credential`](Self::insert_credential) or
    /// [`create_user_with_credential`](Self::create_user_with_credential).
    async fn update_credential_tokens(
        &self,
        user_id: Uuid,
        provider: Provider,
        token: &str,
        refresh_token: Option<&str>,
    ) -> Result<Credential>;

    /// Insert a credential for an existing user. `Conflict` on
    /// [`CREDENTIAL_PAIR_KEY`] when the pair already has a row.
    async fn insert_credential(
        &self,
        user_id: Uuid,
        provider: Provider,
        provider_id: Option<&str>,
        tokens: &TokenPair,
    ) -> Result<Credential>;

    /// Create a user and its first credential in one all-or-nothing unit of
    /// work; a user must never be observable with zero linked identities.
    async fn create_user_with_credential(
        &self,
        profile: &ProfileInfo,
        handle: &str,
        provider: Provider,
        provider_id: Option<&str>,
        tokens: &TokenPair,
    ) -> Result<User>;

    async fn find_entity(&self, platform: &str, platform_id: &str) -> Result<Option<Entity>>;

    /// `Conflict` names [`ENTITY_HANDLE_KEY`] or [`ENTITY_PLATFORM_KEY`] so
    /// the resolver can tell a handle collision from a key collision.
    async fn insert_entity(&self, entity: NewEntity) -> Result<Entity>;

    /// Overwrite the user's stream key hash, returning the updated user.
    async fn set_stream_key(&self, user_id: Uuid, stream_key: &str) -> Result<User>;
}
