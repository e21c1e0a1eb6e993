//! OAuth2 client-credentials endpoint client

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::json;
use tourist_esim_core::{classify, TokenIssuer};
use tourist_esim_domain::{ClientConfig, Credentials, EsimError, Result, Token, TokenResponse};
use tracing::{debug, instrument, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Talks to the token and revocation endpoints
///
/// Grants are sent once, without retry; the caller decides what to do with
/// a failure.
#[derive(Debug, Clone)]
pub struct OAuthTokenClient {
    http: HttpClient,
    token_url: String,
    revoke_url: String,
}

impl OAuthTokenClient {
    pub fn new(http: HttpClient, token_url: impl Into<String>, revoke_url: impl Into<String>) -> Self {
        Self { http, token_url: token_url.into(), revoke_url: revoke_url.into() }
    }

    /// Client for the endpoints named in `config`
    pub fn from_config(http: HttpClient, config: &ClientConfig) -> Self {
        Self::new(http, config.token_url.clone(), config.revoke_url.clone())
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

impl TokenIssuer for OAuthTokenClient {
    #[instrument(skip_all, fields(client_id = %credentials.client_id(), url = %self.token_url))]
    fn request_token(&self, credentials: &Credentials) -> Result<TokenResponse> {
        let body = json!({
            "grant_type": "client_credentials",
            "client_id": credentials.client_id(),
            "client_secret": credentials.client_secret().expose(),
        });

        let request = self.http.request(Method::POST, &self.token_url).json(&body);
        let reply = self.http.send(request).map_err(InfraError::from)?;

        match reply.status {
            200..=299 => {
                debug!("token endpoint accepted grant");
                // A body without a usable access_token is rejected by `into_token`.
                Ok(serde_json::from_str(&reply.body).unwrap_or_default())
            }
            401 => {
                warn!(request_id = ?reply.meta.request_id, "token endpoint rejected credentials");
                Err(EsimError::credentials_rejected(
                    reply.meta.request_id,
                    (!reply.body.is_empty()).then_some(reply.body),
                ))
            }
            status => {
                warn!(status, "token endpoint returned an error");
                Err(EsimError::connection(format!(
                    "token endpoint returned status {status}: {}",
                    reply.body.trim()
                )))
            }
        }
    }

    #[instrument(skip_all, fields(url = %self.revoke_url))]
    fn revoke_token(&self, token: &Token) -> Result<()> {
        let request = self
            .http
            .request(Method::POST, &self.revoke_url)
            .header(AUTHORIZATION, format!("Bearer {}", token.access_token().expose()))
            .json(&json!({ "token": token.access_token().expose() }));

        let reply = self.http.send(request).map_err(InfraError::from)?;
        if reply.is_success() {
            Ok(())
        } else {
            Err(classify(reply.status, &reply.body, reply.meta))
        }
    }
}
