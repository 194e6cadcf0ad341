use super::models::ServiceAccountKey;
use crate::error::{google_calendar_error, BotResult};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// OAuth scope for reading and writing calendar events
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for the signed assertion, in seconds
const ASSERTION_LIFETIME: i64 = 3600;
/// Refresh this many seconds before the access token expires
const EXPIRY_MARGIN: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Obtains and caches access tokens for a service account
#[derive(Clone)]
pub struct TokenManager {
    key: Arc<ServiceAccountKey>,
    client: Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenManager {
    pub fn new(key: ServiceAccountKey, client: Client) -> Self {
        Self {
            key: Arc::new(key),
            client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token, exchanging a fresh assertion if the cached one is
    /// missing or about to expire
    pub async fn get_token(&self) -> BotResult<String> {
        let now = Utc::now().timestamp();

        if let Some(token) = self.cached.read().await.as_ref() {
            if token.expires_at - EXPIRY_MARGIN > now {
                return Ok(token.access_token.clone());
            }
        }

        // Concurrent inserts queue here; only the first one exchanges
        let mut cached = self.cached.write().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN > now {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.fetch_token(now).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    /// Sign a JWT assertion for the token endpoint
    pub fn build_assertion(&self, now: i64) -> BotResult<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: CALENDAR_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME,
        };

        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| google_calendar_error(&format!("Invalid service account private key: {}", e)))?;

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| google_calendar_error(&format!("Failed to sign token assertion: {}", e)))
    }

    async fn fetch_token(&self, now: i64) -> BotResult<CachedToken> {
        debug!("Requesting access token for {}", self.key.client_email);

        let assertion = self.build_assertion(now)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to request token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to request token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        let access_token = token
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?
            .to_string();

        let expires_in = token
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(ASSERTION_LIFETIME);

        Ok(CachedToken {
            access_token,
            expires_at: now + expires_in,
        })
    }
}
