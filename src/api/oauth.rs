//! Access tokens for the Google APIs.
//!
//! The secrets file holds the refresh token of an already-authorized user. Constructing a
//! `TokenProvider` does not touch the network; the first call to `token` exchanges the refresh
//! token for an access token, which is cached until shortly before it expires.

use crate::api::files::GoogleSecrets;
use crate::api::OAUTH_SCOPES;
use crate::error::Res;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    ClientId, ClientSecret, EndpointNotSet, EndpointSet, RefreshToken, Scope, TokenResponse,
    TokenUrl,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Tokens are refreshed once they are this close to expiring.
const EXPIRY_BUFFER_MINUTES: i64 = 5;

/// Used when the token endpoint does not say how long a token lives.
const DEFAULT_LIFETIME_SECONDS: i64 = 3600;

type OAuthClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Hands out access tokens for the two scopes this app uses. Clones share the same cached token,
/// so the Drive and Sheets clients can each hold one.
#[derive(Clone)]
pub(crate) struct TokenProvider {
    client: Arc<OAuthClient>,
    refresh_token: RefreshToken,
    http: reqwest::Client,
    cached: Arc<Mutex<Option<AccessToken>>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + Duration::minutes(EXPIRY_BUFFER_MINUTES)
    }
}

impl TokenProvider {
    /// Builds the authorization object from `secrets`. No network calls are made here.
    pub(crate) fn new(secrets: &GoogleSecrets) -> Res<Self> {
        let token_url = TokenUrl::new(secrets.token_uri().to_string())
            .with_context(|| format!("Invalid google.token_uri '{}'", secrets.token_uri()))?;
        let client = BasicClient::new(ClientId::new(secrets.client_id().to_string()))
            .set_client_secret(ClientSecret::new(secrets.client_secret().to_string()))
            .set_token_uri(token_url);

        // The oauth2 crate requires a client that does not follow redirects.
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Unable to build the HTTP client for OAuth")?;

        Ok(Self {
            client: Arc::new(client),
            refresh_token: RefreshToken::new(secrets.refresh_token().to_string()),
            http,
            cached: Arc::new(Mutex::new(None)),
        })
    }

    /// Returns a valid access token, refreshing it first if it is missing or about to expire.
    pub(crate) async fn token(&self) -> Res<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired(Utc::now()) {
                return Ok(token.secret.clone());
            }
        }
        let token = self.exchange().await?;
        let secret = token.secret.clone();
        *cached = Some(token);
        Ok(secret)
    }

    /// Unconditionally exchanges the refresh token for a new access token.
    pub(crate) async fn refresh(&self) -> Res<()> {
        let token = self.exchange().await?;
        *self.cached.lock().await = Some(token);
        Ok(())
    }

    async fn exchange(&self) -> Res<AccessToken> {
        debug!("Exchanging the refresh token for an access token");
        let response = self
            .client
            .exchange_refresh_token(&self.refresh_token)
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .request_async(&self.http)
            .await
            .context("Failed to refresh the OAuth access token")?;

        let lifetime = response
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .unwrap_or_else(|| Duration::seconds(DEFAULT_LIFETIME_SECONDS));
        let expires_at = Utc::now() + lifetime;
        debug!("Access token valid until: {expires_at}");

        Ok(AccessToken {
            secret: response.access_token().secret().to_string(),
            expires_at,
        })
    }
}
