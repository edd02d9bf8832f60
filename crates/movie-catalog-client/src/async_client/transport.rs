use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;

use crate::errors::{Error, Result};

/// A fully resolved outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}
impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// A response whose body has been fully read
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}
impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a 4XX or 5XX response into an [Error::ApiErrorResponse]
    ///
    /// The message is taken from a `message` or `error` field of a JSON body
    /// when there is one, else it is the raw body.
    pub fn error_for_status(self) -> Result<Self> {
        if !(self.status.is_client_error() || self.status.is_server_error()) {
            return Ok(self);
        }
        log::debug!(
            "{} {}: {}",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("UNKNOWN"),
            self.body
        );
        let message = serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(str::to_owned))
            })
            .unwrap_or(self.body);
        Err(Error::ApiErrorResponse {
            code: self.status.as_u16(),
            message,
        })
    }
}

/// Request options supplied by the caller of an authenticated fetch
///
/// Headers given here take precedence over the ones the client adds.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}
impl FetchOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Sends [HttpRequest]s over the wire
#[async_trait]
pub trait HttpTransport: core::fmt::Debug + Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// The [HttpTransport] used outside of tests
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}
impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        log::debug!("Initiating {method} {url}");
        let req = self.client.request(method, url).headers(headers);
        let req = match body {
            Some(body) => {
                log::debug!("body_str={body}");
                req.body(body)
            }
            None => req,
        };
        let res = req.send().await?;
        log::debug!("res={res:?}");
        let status = res.status();
        let body_bytes = res
            .bytes()
            .await
            .map_err(|e| {
                log::error!("Could not retrieve body bytes: {e}");
                Error::UnretrievableBodyResponse
            })?
            .into();
        let body = String::from_utf8(body_bytes).map_err(|e| {
            log::error!("Body is not valid UTF8: {e}");
            Error::UnretrievableBodyResponse
        })?;
        log::debug!("body_str={body}");
        Ok(HttpResponse { status, body })
    }
}
