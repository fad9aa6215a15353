//! Network collaborator for clpkg.
//!
//! The registry layer only needs "fetch the bytes behind this URL"; that
//! contract is the [`Fetcher`](fetch::Fetcher) trait. [`HttpFetcher`](fetch::HttpFetcher)
//! implements it on top of a process-wide `ureq` agent whose user agent,
//! proxy, headers and timeout are set once through
//! [`configure_http_client`](http_client::configure_http_client).

pub mod error;
pub mod fetch;
pub mod http_client;

pub use error::{DownloadError, Result};
pub use fetch::{Fetcher, HttpFetcher};
