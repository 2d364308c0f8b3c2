use crate::error::RefreshError;
use crate::models::TokenPair;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::ProviderClient;

const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

pub struct GithubClient {
    http: Client,
    client_id: String,
    client_secret: String,
}

impl GithubClient {
    pub fn new(http: Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl ProviderClient for GithubClient {
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPair, RefreshError> {
        // GitHub reports grant failures as 200 responses with an `error`
        // field, so the body is checked as well as the status.
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: Option<String>,
            refresh_token: Option<String>,
            error: Option<String>,
            error_description: Option<String>,
        }

        let mut params = HashMap::new();
        params.insert("client_id", self.client_id.as_str());
        params.insert("client_secret", self.client_secret.as_str());
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);

        let resp = self
            .http
            .post(TOKEN_URL)
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| RefreshError::Network(format!("GitHub token request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RefreshError::ProviderRejected(format!(
                "GitHub token request failed with status {}",
                resp.status()
            )));
        }

        let token: TokenResponse = resp.json().await.map_err(|e| {
            RefreshError::Malformed(format!("Failed to parse GitHub token response: {e}"))
        })?;

        if let Some(error) = token.error {
            return Err(RefreshError::ProviderRejected(format!(
                "GitHub rejected refresh: {error} {}",
                token.error_description.unwrap_or_default()
            )));
        }

        let access_token = token.access_token.ok_or_else(|| {
            RefreshError::Malformed("GitHub response missing access_token".into())
        })?;

        Ok(TokenPair {
            token: access_token,
            refresh_token: token.refresh_token,
        })
    }
}
