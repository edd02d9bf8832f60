mod types;
pub use types::*;

pub mod pagination;
pub mod query_state;

#[cfg(feature = "async_client")]
pub mod errors;

#[cfg(feature = "async_client")]
pub mod async_client;

#[cfg(all(feature = "async_client", not(feature = "blocking_client")))]
pub use async_client::*;

#[cfg(feature = "blocking_client")]
pub mod blocking_client;
#[cfg(feature = "blocking_client")]
pub use blocking_client::*;
