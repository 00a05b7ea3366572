//! OAuth 2.0 identity provider.
//!
//! Silent retrieval exchanges the stored refresh token; interactive
//! retrieval runs the device-authorisation grant, showing the user code
//! through a [`DeviceCodePrompt`] and polling the token endpoint until the
//! user approves, denies or the code expires.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use super::token_store::TokenStore;
use super::{IdentityError, IdentityProvider, IssuedToken};
use crate::presentation::IdentityClaims;

const DEFAULT_SCOPE: &str = "openid profile email offline_access";
const DEVICE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Identity provider coordinates.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    domain: Url,
    client_id: String,
    scope: String,
}

impl OAuthConfig {
    /// Build from a tenant domain (with or without scheme) and client id.
    ///
    /// # Errors
    /// [`IdentityError::NotConfigured`] for a blank or malformed domain or a
    /// blank client id.
    pub fn new(domain: &str, client_id: &str) -> Result<Self, IdentityError> {
        let domain = domain.trim().trim_end_matches('/');
        if domain.is_empty() {
            return Err(IdentityError::NotConfigured("identity domain is empty".to_owned()));
        }
        if client_id.trim().is_empty() {
            return Err(IdentityError::NotConfigured("client id is empty".to_owned()));
        }
        let with_scheme = if domain.contains("://") {
            format!("{domain}/")
        } else {
            format!("https://{domain}/")
        };
        let domain = Url::parse(&with_scheme)
            .map_err(|err| IdentityError::NotConfigured(format!("invalid domain: {err}")))?;
        Ok(Self {
            domain,
            client_id: client_id.trim().to_owned(),
            scope: DEFAULT_SCOPE.to_owned(),
        })
    }

    /// Override the requested scopes.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

/// Shows the device-login instructions to the user.
pub trait DeviceCodePrompt: Send + Sync {
    /// Ask the user to enter `user_code` at `verification_uri`.
    fn show(&self, verification_uri: &str, user_code: &str);
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default)]
    verification_uri_complete: Option<String>,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
}

#[derive(Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// [`IdentityProvider`] speaking OAuth 2.0 to the configured tenant.
pub struct OAuthIdentityProvider {
    http: reqwest::Client,
    config: OAuthConfig,
    store: Arc<dyn TokenStore>,
    prompt: Arc<dyn DeviceCodePrompt>,
}

impl OAuthIdentityProvider {
    /// Provider persisting refresh tokens in `store`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        config: OAuthConfig,
        store: Arc<dyn TokenStore>,
        prompt: Arc<dyn DeviceCodePrompt>,
    ) -> Self {
        Self {
            http,
            config,
            store,
            prompt,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.config
            .domain
            .join(path)
            .map_err(|err| IdentityError::NotConfigured(format!("invalid endpoint: {err}")))
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, IdentityError> {
        let url = self.endpoint(path)?;
        debug!("POST {url}");
        let resp = self.http.post(url).form(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            serde_json::from_str(&body).map_err(|err| IdentityError::Rejected {
                error: "invalid_response".to_owned(),
                description: err.to_string(),
            })
        } else {
            Err(match serde_json::from_str::<OAuthErrorResponse>(&body) {
                Ok(err) => IdentityError::Rejected {
                    error: err.error,
                    description: err.error_description.unwrap_or_default(),
                },
                Err(_) => IdentityError::Rejected {
                    error: status.to_string(),
                    description: body,
                },
            })
        }
    }

    async fn poll_device_code(
        &self,
        device: &DeviceCodeResponse,
    ) -> Result<TokenResponse, IdentityError> {
        let deadline = Instant::now() + Duration::from_secs(device.expires_in);
        let mut interval =
            Duration::from_secs(device.interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS));
        let form = [
            ("grant_type", DEVICE_GRANT),
            ("device_code", device.device_code.as_str()),
            ("client_id", self.config.client_id.as_str()),
        ];
        loop {
            tokio::time::sleep(interval).await;
            if Instant::now() > deadline {
                return Err(IdentityError::Expired);
            }
            match self.post_form::<TokenResponse>("oauth/token", &form).await {
                Ok(token) => return Ok(token),
                Err(IdentityError::Rejected { error, .. }) if error == "authorization_pending" => {
                    debug!("device authorisation pending");
                }
                Err(IdentityError::Rejected { error, .. }) if error == "slow_down" => {
                    interval += SLOW_DOWN_STEP;
                }
                Err(IdentityError::Rejected { error, .. }) if error == "expired_token" => {
                    return Err(IdentityError::Expired);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn issued(token: TokenResponse) -> IssuedToken {
    IssuedToken {
        access_token: SecretString::from(token.access_token),
        refresh_token: token.refresh_token.map(SecretString::from),
    }
}

#[async_trait]
impl IdentityProvider for OAuthIdentityProvider {
    async fn silent_token(&self, audience: Option<&str>) -> Result<IssuedToken, IdentityError> {
        let refresh_token = self
            .store
            .load()?
            .and_then(|credential| credential.refresh_token)
            .ok_or(IdentityError::LoginRequired)?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("refresh_token", refresh_token.expose_secret()),
            ("scope", self.config.scope.as_str()),
        ];
        if let Some(audience) = audience {
            form.push(("audience", audience));
        }
        self.post_form("oauth/token", &form).await.map(issued)
    }

    async fn interactive_token(
        &self,
        audience: Option<&str>,
    ) -> Result<IssuedToken, IdentityError> {
        let mut form = vec![
            ("client_id", self.config.client_id.as_str()),
            ("scope", self.config.scope.as_str()),
        ];
        if let Some(audience) = audience {
            form.push(("audience", audience));
        }
        let device: DeviceCodeResponse = self.post_form("oauth/device/code", &form).await?;
        self.prompt.show(
            device
                .verification_uri_complete
                .as_deref()
                .unwrap_or(&device.verification_uri),
            &device.user_code,
        );
        self.poll_device_code(&device).await.map(issued)
    }

    fn is_authenticated(&self) -> bool {
        matches!(self.store.load(), Ok(Some(_)))
    }

    async fn user_info(
        &self,
        access_token: &SecretString,
    ) -> Result<IdentityClaims, IdentityError> {
        let url = self.endpoint("userinfo")?;
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}
