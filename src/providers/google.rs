use crate::error::RefreshError;
use crate::models::TokenPair;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::ProviderClient;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

pub struct GoogleClient {
    http: Client,
    client_id: String,
    client_secret: String,
}

impl GoogleClient {
    pub fn new(http: Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl ProviderClient for GoogleClient {
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPair, RefreshError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            // Google usually keeps the refresh token stable and omits it here.
            refresh_token: Option<String>,
        }

        let mut params = HashMap::new();
        params.insert("client_id", self.client_id.as_str());
        params.insert("client_secret", self.client_secret.as_str());
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);

        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| RefreshError::Network(format!("Google token request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RefreshError::ProviderRejected(format!(
                "Google token request failed with status {}",
                resp.status()
            )));
        }

        let token: TokenResponse = resp.json().await.map_err(|e| {
            RefreshError::Malformed(format!("Failed to parse Google token response: {e}"))
        })?;

        Ok(TokenPair {
            token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }
}
