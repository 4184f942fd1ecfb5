//! Spotify authorization-code flow
//!
//! Builds the authorize redirect, exchanges the callback code for a token and
//! refreshes expired tokens. The same token endpoint also serves the
//! client-credentials grant used by `SpotifyCatalog` for visitor search.

use async_trait::async_trait;
use serde::Deserialize;
use songreq_common::config::SpotifyConfig;
use tracing::{debug, info};

use crate::catalog::spotify::{build_http_client, error_from_response};
use crate::catalog::CatalogError;
use crate::credential::OAuthToken;

/// Scopes needed to create playlists and add items
pub const SCOPES: &str = "playlist-modify-public playlist-modify-private";

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Convert, keeping `previous_refresh` when the response omits one
    pub fn into_token(self, previous_refresh: Option<String>) -> OAuthToken {
        OAuthToken::new(
            self.access_token,
            self.expires_in,
            self.refresh_token.or(previous_refresh),
            self.scope,
        )
    }
}

/// POST to `<accounts>/api/token` with client credentials as basic auth
pub(crate) async fn request_token(
    http: &reqwest::Client,
    config: &SpotifyConfig,
    form: &[(&str, &str)],
) -> Result<TokenResponse, CatalogError> {
    let (client_id, client_secret) = client_credentials(config)?;
    let url = format!("{}/api/token", config.accounts_base_url.trim_end_matches('/'));

    let response = http
        .post(&url)
        .basic_auth(client_id, Some(client_secret))
        .form(form)
        .send()
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| CatalogError::Parse(e.to_string()))
}

fn client_credentials(config: &SpotifyConfig) -> Result<(&str, &str), CatalogError> {
    match (config.client_id.as_deref(), config.client_secret.as_deref()) {
        (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => {
            Ok((id, secret))
        }
        _ => Err(CatalogError::NotConfigured(
            "Spotify client id/secret missing".to_string(),
        )),
    }
}

/// OAuth authorization flow for the organizer
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    /// URL the organizer is redirected to, carrying `state`
    fn authorize_url(&self, state: &str) -> Result<String, CatalogError>;

    /// Exchange the callback `code` for a token
    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, CatalogError>;

    /// Obtain a fresh token using the refresh token
    async fn refresh(&self, token: &OAuthToken) -> Result<OAuthToken, CatalogError>;
}

/// Spotify accounts-service implementation
pub struct SpotifyOAuth {
    http: reqwest::Client,
    config: SpotifyConfig,
}

impl SpotifyOAuth {
    pub fn new(config: SpotifyConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            http: build_http_client()?,
            config,
        })
    }
}

#[async_trait]
impl AuthorizationFlow for SpotifyOAuth {
    fn authorize_url(&self, state: &str) -> Result<String, CatalogError> {
        let (client_id, _) = client_credentials(&self.config)?;
        let base = format!(
            "{}/authorize",
            self.config.accounts_base_url.trim_end_matches('/')
        );
        let url = url::Url::parse_with_params(
            &base,
            &[
                ("client_id", client_id),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| CatalogError::NotConfigured(format!("Invalid accounts URL: {}", e)))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, CatalogError> {
        debug!("Exchanging authorization code");
        let response = request_token(
            &self.http,
            &self.config,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ],
        )
        .await?;
        info!(scope = ?response.scope, "Organizer authorized with Spotify");
        Ok(response.into_token(None))
    }

    async fn refresh(&self, token: &OAuthToken) -> Result<OAuthToken, CatalogError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(CatalogError::Unauthorized)?;

        let response = request_token(
            &self.http,
            &self.config,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )
        .await?;
        info!("Organizer token refreshed");
        Ok(response.into_token(token.refresh_token.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Credential;

    fn configured() -> SpotifyConfig {
        SpotifyConfig {
            client_id: Some("client-123".into()),
            client_secret: Some("secret".into()),
            redirect_uri: "http://127.0.0.1:5000/callback".into(),
            ..SpotifyConfig::default()
        }
    }

    #[test]
    fn test_authorize_url_carries_required_params() {
        let oauth = SpotifyOAuth::new(configured()).unwrap();
        let url = url::Url::parse(&oauth.authorize_url("xyz").unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("accounts.spotify.com"));
        assert_eq!(url.path(), "/authorize");
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:5000/callback");
        assert_eq!(params["scope"], SCOPES);
        assert_eq!(params["state"], "xyz");
    }

    #[test]
    fn test_authorize_url_requires_client_id() {
        let oauth = SpotifyOAuth::new(SpotifyConfig::default()).unwrap();
        assert!(matches!(
            oauth.authorize_url("s"),
            Err(CatalogError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_is_unauthorized() {
        let oauth = SpotifyOAuth::new(configured()).unwrap();
        let token = OAuthToken::new("a".into(), 0, None, None);
        assert!(matches!(
            oauth.refresh(&token).await,
            Err(CatalogError::Unauthorized)
        ));
    }

    #[test]
    fn test_token_response_keeps_previous_refresh_token() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"new","token_type":"Bearer","expires_in":3600}"#,
        )
        .unwrap();
        let token = response.into_token(Some("old-refresh".into()));
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("old-refresh"));
        assert!(token.is_active());
    }
}
