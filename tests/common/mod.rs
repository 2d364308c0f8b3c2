//! Shared fixtures for identity-core tests.
//!
//! Everything runs against the in-memory store and scripted provider
//! clients; no database or network involved.
#![allow(dead_code)]

use identity_core::error::RefreshError;
use identity_core::providers::ProviderClient;
use identity_core::store::MemoryStore;
use identity_core::{IdentityStore, ProfileInfo, Provider, TokenPair, User};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_HANDLE: &str = "alice";

pub fn memory_store() -> Arc<dyn IdentityStore> {
    Arc::new(MemoryStore::new())
}

pub fn token_pair(token: &str, refresh: Option<&str>) -> TokenPair {
    TokenPair {
        token: token.to_string(),
        refresh_token: refresh.map(str::to_string),
    }
}

pub fn profile(email: Option<&str>, handle: Option<&str>) -> ProfileInfo {
    ProfileInfo {
        email: email.map(str::to_string),
        handle: handle.map(str::to_string),
        name: None,
        avatar_url: None,
    }
}

/// Seed a user with one credential directly through the store.
pub async fn seed_user(
    store: &Arc<dyn IdentityStore>,
    email: &str,
    handle: &str,
    provider: Provider,
    tokens: TokenPair,
) -> User {
    store
        .create_user_with_credential(
            &profile(Some(email), Some(handle)),
            handle,
            provider,
            None,
            &tokens,
        )
        .await
        .expect("seed user")
}

/// Provider client that behaves like a real token endpoint: it tracks which
/// refresh token is currently valid, serves scripted responses in order, and
/// rejects anything stale.
pub struct RotatingProviderClient {
    valid_refresh: Mutex<String>,
    responses: Mutex<VecDeque<TokenPair>>,
}

impl RotatingProviderClient {
    pub fn new(valid_refresh: &str, responses: Vec<TokenPair>) -> Self {
        Self {
            valid_refresh: Mutex::new(valid_refresh.to_string()),
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl ProviderClient for RotatingProviderClient {
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPair, RefreshError> {
        let mut valid = self.valid_refresh.lock().unwrap();
        if refresh_token != *valid {
            return Err(RefreshError::ProviderRejected(
                "stale refresh token".to_string(),
            ));
        }
        let pair = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RefreshError::Malformed("scripted responses exhausted".to_string()))?;
        if let Some(next) = &pair.refresh_token {
            *valid = next.clone();
        }
        Ok(pair)
    }
}

/// Provider client that always fails with a network error.
pub struct UnreachableProviderClient;

#[async_trait]
impl ProviderClient for UnreachableProviderClient {
    async fn exchange_refresh_token(
        &self,
        _refresh_token: &str,
    ) -> Result<TokenPair, RefreshError> {
        Err(RefreshError::Network("connection refused".to_string()))
    }
}
