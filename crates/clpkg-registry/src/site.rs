use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use clpkg_dl::Fetcher;
use tracing::{debug, info, warn};

use crate::{
    cache::RegistryCache,
    descriptor::{parse_many, PackageDescriptor},
    error::{CacheError, FetchError},
};

type Index = BTreeMap<String, Vec<PackageDescriptor>>;

/// Outcome of a successful [`Site::refresh`].
#[derive(Debug)]
pub struct RefreshSummary {
    /// Number of descriptors in the new index.
    pub packages: usize,
    pub cache_path: PathBuf,
    /// Set when the fresh listing could not be written to the cache. The
    /// in-memory index is up to date regardless.
    pub cache_error: Option<CacheError>,
}

/// One remote registry and its local cache.
#[derive(Debug)]
pub struct Site {
    url: String,
    cache: RegistryCache,
    index: Index,
}

impl Site {
    /// Creates a site caching under `cache_root` and loads its cached listing
    /// if there is one.
    pub fn new<U: Into<String>, P: Into<PathBuf>>(url: U, cache_root: P) -> Self {
        Self::with_cache(url, RegistryCache::new(cache_root))
    }

    pub fn with_cache<U: Into<String>>(url: U, cache: RegistryCache) -> Self {
        let mut site = Self {
            url: url.into(),
            cache,
            index: Index::new(),
        };
        site.load_from_cache();
        site
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache.path_for(&self.url)
    }

    /// Endpoint serving the site's listing.
    pub fn packages_url(&self) -> String {
        format!("{}/packages", self.url.trim_end_matches('/'))
    }

    /// Replaces the index with the cached listing.
    ///
    /// Returns `false`, leaving the index empty, when the cache file is
    /// missing, unreadable or corrupt.
    pub fn load_from_cache(&mut self) -> bool {
        self.index.clear();

        match self.cache.read(&self.url) {
            Ok(packages) => {
                self.index = build_index(packages);
                debug!("loaded {} packages for {} from cache", self.size(), self.url);
                true
            }
            Err(CacheError::Missing(path)) => {
                debug!("no cache for {} at {}", self.url, path.display());
                false
            }
            Err(err) => {
                warn!("ignoring cache for {}: {}", self.url, err);
                false
            }
        }
    }

    /// Fetches the site's listing and replaces the index with it.
    ///
    /// The index is left untouched when the fetch fails or the payload is not
    /// a valid listing. On success the payload is written to the cache; a
    /// failed write is reported in the summary.
    pub fn refresh<F: Fetcher + ?Sized>(&mut self, fetcher: &F) -> Result<RefreshSummary, FetchError> {
        let url = self.packages_url();
        info!("Syncing {}", self.url);

        let payload = fetcher.fetch(&url).map_err(|source| {
            FetchError::Network {
                url: url.clone(),
                source,
            }
        })?;

        let packages = parse_many(&payload).map_err(|source| {
            FetchError::Malformed {
                url: url.clone(),
                source,
            }
        })?;

        let count = packages.len();
        self.index = build_index(packages);

        let cache_error = match self.cache.write(&self.url, &payload) {
            Ok(_) => None,
            Err(err) => {
                warn!("failed to cache listing for {}: {}", self.url, err);
                Some(err)
            }
        };

        Ok(RefreshSummary {
            packages: count,
            cache_path: self.cache_path(),
            cache_error,
        })
    }

    /// All descriptors named `name`, in listing order.
    pub fn lookup(&self, name: &str) -> &[PackageDescriptor] {
        self.index.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of descriptors across all names.
    pub fn size(&self) -> usize {
        self.index.values().map(Vec::len).sum()
    }

    /// Package names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Removes the site's cache file. The in-memory index is kept.
    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.remove(&self.url)
    }

    pub fn cache_root(&self) -> &Path {
        self.cache.root()
    }
}

fn build_index(packages: Vec<PackageDescriptor>) -> Index {
    let mut index = Index::new();
    for pkg in packages {
        index.entry(pkg.name().to_string()).or_default().push(pkg);
    }
    index
}
