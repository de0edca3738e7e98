use crate::error::{auth_error, google_calendar_error, SyncResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Google OAuth2 token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this many seconds before they actually expire
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Default lifetime when the token endpoint does not say
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// OAuth2 tokens as cached on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix seconds
    pub expires_at: i64,
}

impl StoredToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - EXPIRY_LEEWAY_SECS <= now.timestamp()
    }
}

/// Response of the token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Google usually omits the refresh token on refresh, keep the old one then
    pub fn into_stored(self, previous_refresh: Option<String>, now: DateTime<Utc>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: now.timestamp() + self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        }
    }
}

/// Source of OAuth2 credentials for the calendar client
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Load the current token
    async fn load(&self) -> SyncResult<StoredToken>;

    /// Exchange the refresh token for a new access token
    async fn refresh(&self, token: &StoredToken) -> SyncResult<StoredToken>;

    /// Save a token for later runs
    async fn persist(&self, token: &StoredToken) -> SyncResult<()>;

    /// A valid access token, refreshing and persisting it when expired
    async fn access_token(&self) -> SyncResult<String> {
        let token = self.load().await?;
        if !token.is_expired(Utc::now()) {
            return Ok(token.access_token);
        }

        info!("Access token expired, refreshing");
        let refreshed = self.refresh(&token).await?;
        self.persist(&refreshed).await?;
        Ok(refreshed.access_token)
    }
}

/// Credentials cached in a JSON file and refreshed against the token endpoint
pub struct FileCredentialProvider {
    path: PathBuf,
    client_id: String,
    client_secret: String,
    token_url: String,
    client: Client,
    cached: RwLock<Option<StoredToken>>,
}

impl FileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>, client_id: String, client_secret: String) -> Self {
        Self {
            path: path.into(),
            client_id,
            client_secret,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            client: Client::new(),
            cached: RwLock::new(None),
        }
    }

    /// Use another token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exchange an authorization code for tokens and persist them
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> SyncResult<StoredToken> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self.request_token(&params, "exchange authorization code").await?;
        let token = response.into_stored(None, Utc::now());
        if token.refresh_token.is_none() {
            return Err(auth_error("Token response has no refresh token"));
        }

        self.persist(&token).await?;
        Ok(token)
    }

    async fn request_token(&self, params: &[(&str, &str)], action: &str) -> SyncResult<TokenResponse> {
        let response = self.client.post(&self.token_url).form(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            let message = format!("Failed to {}: HTTP {} - {}", action, status, error_body);
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    auth_error(&message)
                }
                _ => google_calendar_error(&message),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn load(&self) -> SyncResult<StoredToken> {
        if let Some(token) = self.cached.read().await.as_ref() {
            return Ok(token.clone());
        }

        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(auth_error(&format!(
                    "No token file at {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let token: StoredToken = serde_json::from_str(&content).map_err(|e| {
            auth_error(&format!("Token file {} is invalid: {}", self.path.display(), e))
        })?;
        debug!("Loaded token from {}", self.path.display());

        *self.cached.write().await = Some(token.clone());
        Ok(token)
    }

    async fn refresh(&self, token: &StoredToken) -> SyncResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| auth_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.request_token(&params, "refresh token").await?;
        Ok(response.into_stored(token.refresh_token.clone(), Utc::now()))
    }

    async fn persist(&self, token: &StoredToken) -> SyncResult<()> {
        let json = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, json).await?;
        *self.cached.write().await = Some(token.clone());
        debug!("Saved token to {}", self.path.display());
        Ok(())
    }
}
