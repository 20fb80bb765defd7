//! OAuth2 client-credential token provider
//!
//! Application-only authentication against Azure AD: a client ID and
//! secret are exchanged for a bearer token scoped to the Graph API.
//! Tokens are cached and refreshed five minutes before expiry so no
//! request ever goes out with a token about to lapse.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use spdrive_core::config::Credentials;
use spdrive_core::domain::errors::TransferError;
use spdrive_core::ports::ICredentialProvider;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default token endpoint template; `{tenant}` is substituted
const TOKEN_URL_TEMPLATE: &str = "https://login.microsoftonline.com/{tenant}/oauth2/v2.0/token";

/// Scope requesting all application permissions granted to the app
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Refresh this long before the token actually expires
const REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Utc::now() + ChronoDuration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Acquires and caches application tokens via the client-credential flow
pub struct ClientCredentialProvider {
    http: Client,
    credentials: Credentials,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialProvider {
    pub fn new(credentials: Credentials) -> Self {
        let token_url = TOKEN_URL_TEMPLATE.replace("{tenant}", &credentials.tenant_id);
        Self {
            http: Client::new(),
            credentials,
            token_url,
            cached: Mutex::new(None),
        }
    }

    /// Uses a custom token endpoint (useful for testing)
    pub fn with_token_url(credentials: Credentials, token_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            credentials,
            token_url: token_url.into(),
            cached: Mutex::new(None),
        }
    }

    async fn fetch_token(&self) -> Result<CachedToken, TransferError> {
        debug!("Requesting application token");
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
        ];
        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| TransferError::Auth(format!("Token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Auth(format!(
                "Token endpoint returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TransferError::Auth(format!("Malformed token response: {e}")))?;

        let expires_at = Utc::now() + ChronoDuration::seconds(token.expires_in);
        info!(expires_in = token.expires_in, "Acquired application token");
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl ICredentialProvider for ClientCredentialProvider {
    async fn bearer_token(&self) -> Result<String, TransferError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
            debug!("Cached token near expiry, refreshing");
        }
        let fresh = self.fetch_token().await?;
        let access = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access)
    }
}
