use tracing::debug;
use url::Url;

use crate::{
    error::{DownloadError, Result},
    http_client::SHARED_AGENT,
};

/// Blocking "fetch the bytes behind this URL" primitive.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetcher`] backed by the shared `ureq` agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Url::parse(url).map_err(|source| {
            DownloadError::InvalidUrl {
                url: url.to_string(),
                source,
            }
        })?;

        debug!("Fetching {}", url);

        let resp = SHARED_AGENT.get(url).call().map_err(|err| {
            match err {
                ureq::Error::StatusCode(status) => {
                    DownloadError::HttpError {
                        status,
                        url: url.to_string(),
                    }
                }
                err => DownloadError::from(err),
            }
        })?;

        if !resp.status().is_success() {
            return Err(DownloadError::HttpError {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.into_body().read_to_vec()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_rejects_invalid_url() {
        let err = HttpFetcher.fetch("not a url").unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl { .. }));
    }
}
