/// Entity resolution: deduplicate platform-scoped identity projections and
/// settle handle collisions deterministically.
use crate::error::Result;
use crate::models::entity::INTERNAL_PLATFORM;
use crate::models::{Entity, NewEntity, User};
use crate::store::{IdentityStore, ENTITY_HANDLE_KEY};
use std::sync::Arc;

pub struct EntityResolver {
    store: Arc<dyn IdentityStore>,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Return the entity for `(platform, platform_id)`, creating it if
    /// missing. First write wins: an existing entity is returned as-is, no
    /// field reconciliation.
    ///
    /// If the insert hits the handle uniqueness index, retry exactly once
    /// with the platform id as the handle. Platform ids are unique within a
    /// platform, so the retry cannot collide on the handle again and the
    /// whole operation terminates in at most two attempts. Any other insert
    /// failure, including a failure of the retry itself, propagates
    /// unchanged.
    pub async fn get_or_create(&self, entity: NewEntity) -> Result<Entity> {
        if let Some(existing) = self
            .store
            .find_entity(&entity.platform, &entity.platform_id)
            .await?
        {
            return Ok(existing);
        }

        match self.store.insert_entity(entity.clone()).await {
            Ok(created) => Ok(created),
            Err(err) if err.is_conflict_on(ENTITY_HANDLE_KEY) => {
                tracing::debug!(
                    platform = entity.platform,
                    handle = entity.handle,
                    "entity handle taken, falling back to platform id"
                );
                let mut fallback = entity;
                fallback.handle = fallback.platform_id.clone();
                // Exactly one retry; a second failure is a hard error.
                self.store.insert_entity(fallback).await
            }
            Err(err) => Err(err),
        }
    }

    /// Entity projection of a local user: platform "internal", keyed by the
    /// stringified user id, suggested handle taken from the user.
    pub async fn get_or_create_for_user(&self, user: &User) -> Result<Entity> {
        self.get_or_create(NewEntity {
            platform: INTERNAL_PLATFORM.to_string(),
            platform_id: user.id.to_string(),
            user_id: user.id,
            handle: user.handle.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            platform_meta: serde_json::json!({}),
        })
        .await
    }
}
