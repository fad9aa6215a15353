use std::collections::HashMap;

use clpkg_dl::{DownloadError, Fetcher};

/// Serves fixed bodies keyed by URL; anything else is a 404.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.as_bytes().to_vec());
        self
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> clpkg_dl::Result<Vec<u8>> {
        self.bodies.get(url).cloned().ok_or_else(|| {
            DownloadError::HttpError {
                status: 404,
                url: url.to_string(),
            }
        })
    }
}

pub fn entry(name: &str, version: &str, code: i64) -> String {
    format!(r#"{{"name":"{name}","version":{{"name":"{version}","code":{code}}}}}"#)
}

pub fn listing(entries: &[String]) -> String {
    format!("[{}]", entries.join(","))
}
