use crate::error::RefreshError;
use crate::models::TokenPair;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::ProviderClient;

const TOKEN_URL: &str = "https://api.restream.io/oauth/token";

pub struct RestreamClient {
    http: Client,
    client_id: String,
    client_secret: String,
}

impl RestreamClient {
    pub fn new(http: Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl ProviderClient for RestreamClient {
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPair, RefreshError> {
        // Restream rotates the refresh token on every exchange.
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            refresh_token: String,
        }

        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);

        let resp = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| RefreshError::Network(format!("Restream token request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RefreshError::ProviderRejected(format!(
                "Restream token request failed with status {}",
                resp.status()
            )));
        }

        let token: TokenResponse = resp.json().await.map_err(|e| {
            RefreshError::Malformed(format!("Failed to parse Restream token response: {e}"))
        })?;

        Ok(TokenPair {
            token: token.access_token,
            refresh_token: Some(token.refresh_token),
        })
    }
}
