pub(crate) mod auth;
pub(crate) mod client;
pub(crate) mod transport;

pub use crate::errors::Error;
pub use auth::{AuthSession, AuthToken};
pub use client::{CatalogClient, GenreCache};
pub use transport::{FetchOptions, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

// Expose the HTTP types used by the transport seam
pub use reqwest::{header, Method, StatusCode};
