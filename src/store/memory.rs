use crate::error::{IdentityError, Result};
use crate::models::{
    Credential, Entity, IdentityKind, NewEntity, ProfileInfo, Provider, TokenPair, User,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use super::{
    IdentityStore, CREDENTIAL_PAIR_KEY, ENTITY_HANDLE_KEY, ENTITY_PLATFORM_KEY, USER_EMAIL_KEY,
};

/// In-memory identity store for tests and local development.
///
/// Mirrors the Postgres contract, including which unique constraint a
/// conflict names. Mutations take the table lock for their full duration, so
/// every write is a point-write just like a single SQL statement.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    credentials: Vec<Credential>,
    entities: Vec<Entity>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflict(constraint: &str) -> IdentityError {
    IdentityError::Conflict {
        constraint: constraint.to_string(),
    }
}

impl Tables {
    fn check_email_unique(&self, email: Option<&str>) -> Result<()> {
        if let Some(email) = email {
            let taken = self.users.iter().any(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            });
            if taken {
                return Err(conflict(USER_EMAIL_KEY));
            }
        }
        Ok(())
    }

    fn new_credential(
        user_id: Uuid,
        provider: Provider,
        provider_id: Option<&str>,
        tokens: &TokenPair,
    ) -> Credential {
        let now = Utc::now();
        Credential {
            id: Uuid::new_v4(),
            user_id,
            provider,
            provider_id: provider_id.map(str::to_string),
            provider_token: tokens.token.clone(),
            provider_refresh_token: tokens.refresh_token.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let tables = self.inner.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn find_user_by_provider_identity(
        &self,
        provider: Provider,
        identity: &str,
    ) -> Result<Option<User>> {
        match provider.identity_kind() {
            IdentityKind::Email => self.find_user_by_email(identity).await,
            IdentityKind::ProviderId => {
                let tables = self.inner.lock().unwrap();
                let user_id = tables
                    .credentials
                    .iter()
                    .find(|c| c.provider == provider && c.provider_id.as_deref() == Some(identity))
                    .map(|c| c.user_id);
                Ok(user_id.and_then(|id| tables.users.iter().find(|u| u.id == id).cloned()))
            }
        }
    }

    async fn find_credential(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<Credential>> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .credentials
            .iter()
            .find(|c| c.user_id == user_id && c.provider == provider)
            .cloned())
    }

    async fn list_credentials(&self, user_id: Uuid) -> Result<Vec<Credential>> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .credentials
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_credential_tokens(
        &self,
        user_id: Uuid,
        provider: Provider,
        token: &str,
        refresh_token: Option<&str>,
    ) -> Result<Credential> {
        let mut tables = self.inner.lock().unwrap();
        let credential = tables
            .credentials
            .iter_mut()
            .find(|c| c.user_id == user_id && c.provider == provider)
            .ok_or(IdentityError::NotFound("credential"))?;
        credential.provider_token = token.to_string();
        credential.provider_refresh_token = refresh_token.map(str::to_string);
        credential.updated_at = Utc::now();
        Ok(credential.clone())
    }

    async fn insert_credential(
        &self,
        user_id: Uuid,
        provider: Provider,
        provider_id: Option<&str>,
        tokens: &TokenPair,
    ) -> Result<Credential> {
        let mut tables = self.inner.lock().unwrap();
        let exists = tables
            .credentials
            .iter()
            .any(|c| c.user_id == user_id && c.provider == provider);
        if exists {
            return Err(conflict(CREDENTIAL_PAIR_KEY));
        }
        let credential = Tables::new_credential(user_id, provider, provider_id, tokens);
        tables.credentials.push(credential.clone());
        Ok(credential)
    }

    async fn create_user_with_credential(
        &self,
        profile: &ProfileInfo,
        handle: &str,
        provider: Provider,
        provider_id: Option<&str>,
        tokens: &TokenPair,
    ) -> Result<User> {
        let mut tables = self.inner.lock().unwrap();
        // Both rows land under one lock hold: all-or-nothing, same as the
        // Postgres transaction.
        tables.check_email_unique(profile.email.as_deref())?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: profile.email.clone(),
            handle: handle.to_string(),
            name: profile.name.clone(),
            avatar_url: profile.avatar_url.clone(),
            stream_key: None,
            created_at: now,
            updated_at: now,
        };
        let credential = Tables::new_credential(user.id, provider, provider_id, tokens);
        tables.users.push(user.clone());
        tables.credentials.push(credential);
        Ok(user)
    }

    async fn find_entity(&self, platform: &str, platform_id: &str) -> Result<Option<Entity>> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .entities
            .iter()
            .find(|e| e.platform == platform && e.platform_id == platform_id)
            .cloned())
    }

    async fn insert_entity(&self, entity: NewEntity) -> Result<Entity> {
        let mut tables = self.inner.lock().unwrap();
        if tables
            .entities
            .iter()
            .any(|e| e.platform == entity.platform && e.platform_id == entity.platform_id)
        {
            return Err(conflict(ENTITY_PLATFORM_KEY));
        }
        if tables.entities.iter().any(|e| e.handle == entity.handle) {
            return Err(conflict(ENTITY_HANDLE_KEY));
        }
        let now = Utc::now();
        let entity = Entity {
            id: Uuid::new_v4(),
            platform: entity.platform,
            platform_id: entity.platform_id,
            user_id: entity.user_id,
            handle: entity.handle,
            name: entity.name,
            avatar_url: entity.avatar_url,
            platform_meta: entity.platform_meta,
            created_at: now,
            updated_at: now,
        };
        tables.entities.push(entity.clone());
        Ok(entity)
    }

    async fn set_stream_key(&self, user_id: Uuid, stream_key: &str) -> Result<User> {
        let mut tables = self.inner.lock().unwrap();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(IdentityError::NotFound("user"))?;
        user.stream_key = Some(stream_key.to_string());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}
