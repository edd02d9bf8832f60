use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to get auth token: {code}")]
    AuthenticationFailed { code: u16 },
    #[error("The auth endpoint could not be reached: {0}")]
    AuthEndpointUnreachable(String),
    #[error("The auth endpoint answered without a usable token: {0}")]
    InvalidTokenResponse(String),
    #[error("The client received an unexpected response that could not be parsed: {source}")]
    MalformedJsonResponse {
        #[from]
        source: serde_json::Error,
    },
    #[error("Could not send the request: {source}")]
    SendRequestError {
        #[from]
        source: reqwest::Error,
    },
    #[error("Cannot retrieve the response body string")]
    UnretrievableBodyResponse,
    #[error("Catalog API responded with error {code}: {message}")]
    ApiErrorResponse { code: u16, message: String },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Could not read the genres from the cache: {0}")]
    GenreCacheReadError(String),
    #[error("Could not write the genres in the cache: {0}")]
    GenreCacheWriteError(String),
    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    pub fn generic(e: impl core::fmt::Display) -> Self {
        Self::Generic(e.to_string())
    }

    /// Returns `true` if the error comes from the auth endpoint rather than
    /// from the catalog itself.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailed { .. }
                | Error::AuthEndpointUnreachable(_)
                | Error::InvalidTokenResponse(_)
        )
    }

    /// Returns `true` if the catalog reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ApiErrorResponse { code: 404, .. })
    }
}
