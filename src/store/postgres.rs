use crate::error::{IdentityError, Result};
use crate::models::{
    Credential, Entity, IdentityKind, NewEntity, ProfileInfo, Provider, TokenPair, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::IdentityStore;

/// Postgres-backed identity store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw credential row; `provider` is stored as text and converted on read.
#[derive(Debug, FromRow)]
struct CredentialRow {
    id: Uuid,
    user_id: Uuid,
    provider: String,
    provider_id: Option<String>,
    provider_token: String,
    provider_refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CredentialRow {
    fn into_credential(self) -> Result<Credential> {
        let provider = Provider::from_str(&self.provider).ok_or_else(|| {
            IdentityError::Store(format!("unknown provider in store: {}", self.provider))
        })?;
        Ok(Credential {
            id: self.id,
            user_id: self.user_id,
            provider,
            provider_id: self.provider_id,
            provider_token: self.provider_token,
            provider_refresh_token: self.provider_refresh_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EntityRow {
    id: Uuid,
    platform: String,
    platform_id: String,
    user_id: Uuid,
    handle: String,
    name: Option<String>,
    avatar_url: Option<String>,
    platform_meta: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EntityRow> for Entity {
    fn from(row: EntityRow) -> Self {
        Entity {
            id: row.id,
            platform: row.platform,
            platform_id: row.platform_id,
            user_id: row.user_id,
            handle: row.handle,
            name: row.name,
            avatar_url: row.avatar_url,
            platform_meta: row.platform_meta,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_provider_identity(
        &self,
        provider: Provider,
        identity: &str,
    ) -> Result<Option<User>> {
        match provider.identity_kind() {
            IdentityKind::Email => self.find_user_by_email(identity).await,
            IdentityKind::ProviderId => {
                let user = sqlx::query_as::<_, User>(
                    r#"
                    SELECT u.* FROM users u
                    JOIN credentials c ON c.user_id = u.id
                    WHERE c.provider = $1 AND c.provider_id = $2
                    "#,
                )
                .bind(provider.as_str())
                .bind(identity)
                .fetch_optional(&self.pool)
                .await?;
                Ok(user)
            }
        }
    }

    async fn find_credential(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT * FROM credentials WHERE user_id = $1 AND provider = $2",
        )
        .bind(user_id)
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(CredentialRow::into_credential).transpose()
    }

    async fn list_credentials(&self, user_id: Uuid) -> Result<Vec<Credential>> {
        let rows = sqlx::query_as::<_, CredentialRow>(
            "SELECT * FROM credentials WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(CredentialRow::into_credential)
            .collect()
    }

    async fn update_credential_tokens(
        &self,
        user_id: Uuid,
        provider: Provider,
        token: &str,
        refresh_token: Option<&str>,
    ) -> Result<Credential> {
        // Single statement so both token fields land together or not at all.
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            UPDATE credentials
            SET provider_token = $3, provider_refresh_token = $4, updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $1 AND provider = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(provider.as_str())
        .bind(token)
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(IdentityError::NotFound("credential"))?;
        row.into_credential()
    }

    async fn insert_credential(
        &self,
        user_id: Uuid,
        provider: Provider,
        provider_id: Option<&str>,
        tokens: &TokenPair,
    ) -> Result<Credential> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            INSERT INTO credentials (id, user_id, provider, provider_id, provider_token, provider_refresh_token, created_at, updated_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(provider.as_str())
        .bind(provider_id)
        .bind(&tokens.token)
        .bind(tokens.refresh_token.as_deref())
        .fetch_one(&self.pool)
        .await?;
        row.into_credential()
    }

    async fn create_user_with_credential(
        &self,
        profile: &ProfileInfo,
        handle: &str,
        provider: Provider,
        provider_id: Option<&str>,
        tokens: &TokenPair,
    ) -> Result<User> {
        // User row and first credential row commit together or not at all.
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, handle, name, avatar_url, created_at, updated_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            RETURNING *
            "#,
        )
        .bind(profile.email.as_deref())
        .bind(handle)
        .bind(profile.name.as_deref())
        .bind(profile.avatar_url.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO credentials (id, user_id, provider, provider_id, provider_token, provider_refresh_token, created_at, updated_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(user.id)
        .bind(provider.as_str())
        .bind(provider_id)
        .bind(&tokens.token)
        .bind(tokens.refresh_token.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn find_entity(&self, platform: &str, platform_id: &str) -> Result<Option<Entity>> {
        let row = sqlx::query_as::<_, EntityRow>(
            "SELECT * FROM entities WHERE platform = $1 AND platform_id = $2",
        )
        .bind(platform)
        .bind(platform_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Entity::from))
    }

    async fn insert_entity(&self, entity: NewEntity) -> Result<Entity> {
        let row = sqlx::query_as::<_, EntityRow>(
            r#"
            INSERT INTO entities (id, platform, platform_id, user_id, handle, name, avatar_url, platform_meta, created_at, updated_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            RETURNING *
            "#,
        )
        .bind(&entity.platform)
        .bind(&entity.platform_id)
        .bind(entity.user_id)
        .bind(&entity.handle)
        .bind(entity.name.as_deref())
        .bind(entity.avatar_url.as_deref())
        .bind(&entity.platform_meta)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn set_stream_key(&self, user_id: Uuid, stream_key: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET stream_key = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(stream_key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(IdentityError::NotFound("user"))?;
        Ok(user)
    }
}
