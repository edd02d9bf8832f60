use std::sync::{Arc, Mutex};

use serde::Deserialize;

use super::transport::{HttpRequest, HttpTransport};
use crate::errors::{Error, Result};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// An opaque bearer token for the catalog API
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Box<str>);
impl AuthToken {
    pub fn new(token: impl Into<Box<str>>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl core::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Holds the single cached [AuthToken] of a client
///
/// Clones share the same token slot. The slot is never locked across a
/// network call, so concurrent refreshes race and the last one wins.
#[derive(Debug, Clone)]
pub struct AuthSession {
    token_endpoint: Arc<str>,
    token: Arc<Mutex<Option<AuthToken>>>,
}

impl AuthSession {
    pub fn new(token_endpoint: impl Into<Arc<str>>, token: Option<AuthToken>) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            token: Arc::new(Mutex::new(token)),
        }
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    pub fn has_token(&self) -> bool {
        self.token.lock().expect("invalid mutex state").is_some()
    }

    pub fn cached_token(&self) -> Option<AuthToken> {
        self.token.lock().expect("invalid mutex state").clone()
    }

    pub fn set_token(&self, token: Option<AuthToken>) {
        let mut mutex_guard = self.token.lock().expect("invalid mutex state");
        *mutex_guard = token;
    }

    /// Return the cached token, or fetch a new one
    ///
    /// With `force_refresh`, or when nothing is cached, the token endpoint is
    /// called and its answer replaces the cached token.
    ///
    /// # Errors
    /// [Error::AuthEndpointUnreachable] if the request could not be sent and
    /// [Error::AuthenticationFailed] if the endpoint answered with a non-2XX
    /// status, [Error::InvalidTokenResponse] if a 2XX answer holds no token.
    pub async fn get_token(
        &self,
        transport: &dyn HttpTransport,
        force_refresh: bool,
    ) -> Result<AuthToken> {
        if !force_refresh {
            if let Some(token) = self.cached_token() {
                return Ok(token);
            }
        }

        log::debug!("Fetching a new auth token (force_refresh={force_refresh})");
        let response = transport
            .send(HttpRequest::get(self.token_endpoint()))
            .await
            .map_err(|e| {
                log::error!("Could not reach the auth endpoint: {e}");
                Error::AuthEndpointUnreachable(e.to_string())
            })?;
        if !response.is_success() {
            log::error!("Failed to get auth token: {}", response.status);
            return Err(Error::AuthenticationFailed {
                code: response.status.as_u16(),
            });
        }
        let token = response
            .json::<TokenResponse>()
            .map(|r| AuthToken::new(r.token))
            .map_err(|e| {
                log::error!("Unexpected auth endpoint response: {e}");
                Error::InvalidTokenResponse(e.to_string())
            })?;
        self.set_token(Some(token.clone()));
        Ok(token)
    }
}
