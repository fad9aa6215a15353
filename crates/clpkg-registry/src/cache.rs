//! Per-site on-disk cache of package listings.
//!
//! Every site owns one file, `<cache root>/sites/<sanitized url>.json`, holding
//! the listing payload exactly as the site last served it.

use std::path::{Path, PathBuf};

use clpkg_utils::fs::{read_file, safe_remove, write_file};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::debug;

use crate::{
    descriptor::{parse_many, PackageDescriptor},
    error::CacheError,
};

/// Characters escaped before `/` is folded into `@`.
///
/// `%` and `@` must be escaped for the mapping to stay injective. `\` and `:`
/// are not portable in file names.
const FILENAME_ESCAPES: &AsciiSet = &CONTROLS.add(b'%').add(b'@').add(b'\\').add(b':');

const SITES_DIR: &str = "sites";

/// Maps a site URL to its cache file name (without extension).
///
/// Distinct URLs always map to distinct names.
pub fn sanitize_site_url(url: &str) -> String {
    utf8_percent_encode(url, FILENAME_ESCAPES)
        .to_string()
        .replace('/', "@")
}

/// Cache files under a single cache root.
#[derive(Debug, Clone)]
pub struct RegistryCache {
    root: PathBuf,
}

impl RegistryCache {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every site's cache file.
    pub fn sites_dir(&self) -> PathBuf {
        self.root.join(SITES_DIR)
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.sites_dir()
            .join(format!("{}.json", sanitize_site_url(url)))
    }

    /// Reads and parses the cached listing for `url`.
    ///
    /// # Errors
    ///
    /// * [`CacheError::Missing`] if no cache file exists
    /// * [`CacheError::Io`] if the file could not be read
    /// * [`CacheError::Corrupt`] if the file is not a valid listing
    pub fn read(&self, url: &str) -> Result<Vec<PackageDescriptor>, CacheError> {
        let path = self.path_for(url);
        debug!("reading cache {}", path.display());

        let content = read_file(&path).map_err(|err| {
            if err.is_not_found() {
                CacheError::Missing(path.clone())
            } else {
                CacheError::Io(err)
            }
        })?;

        parse_many(&content).map_err(|source| {
            CacheError::Corrupt {
                path,
                source,
            }
        })
    }

    /// Stores `payload` verbatim as the cached listing for `url`.
    pub fn write(&self, url: &str, payload: &[u8]) -> Result<PathBuf, CacheError> {
        let path = self.path_for(url);
        debug!("writing {} bytes to cache {}", payload.len(), path.display());
        write_file(&path, payload)?;
        Ok(path)
    }

    /// Removes the cached listing for `url`. A missing file is not an error.
    pub fn remove(&self, url: &str) -> Result<(), CacheError> {
        safe_remove(self.path_for(url))?;
        Ok(())
    }

    /// Removes every cached listing.
    pub fn clear(&self) -> Result<(), CacheError> {
        safe_remove(self.sites_dir())?;
        Ok(())
    }
}
