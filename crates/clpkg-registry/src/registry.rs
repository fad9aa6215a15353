use std::path::PathBuf;

use clpkg_config::{config::Config, error::Result as ConfigResult};
use clpkg_dl::Fetcher;
use tracing::debug;

use crate::{
    descriptor::PackageDescriptor,
    error::{CacheError, FetchError},
    site::{RefreshSummary, Site},
};

/// All configured sites, queried as one.
///
/// Site order is significant: when several sites carry the same package
/// version, the copy from the earliest site is the one returned.
#[derive(Debug, Default)]
pub struct Registry {
    sites: Vec<Site>,
}

impl Registry {
    /// Creates a registry over `urls`, each site caching under `cache_root`.
    pub fn new<I, S>(urls: I, cache_root: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cache_root = cache_root.into();
        let sites = urls
            .into_iter()
            .map(|url| Site::new(url, cache_root.clone()))
            .collect();

        Self {
            sites,
        }
    }

    /// Creates a registry from the sites and cache root in `config`.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let urls = config.site_urls()?;
        let cache_root = config.get_cache_path()?;
        debug!("configuring {} sites under {}", urls.len(), cache_root.display());
        Ok(Self::new(urls, cache_root))
    }

    pub fn from_sites(sites: Vec<Site>) -> Self {
        Self {
            sites,
        }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Every known version of `name`, sorted by version code, with at most
    /// one descriptor per version.
    pub fn lookup(&self, name: &str) -> Vec<PackageDescriptor> {
        let mut found: Vec<PackageDescriptor> = self
            .sites
            .iter()
            .flat_map(|site| site.lookup(name).iter().cloned())
            .collect();

        // Stable, so the earliest site's copy leads each run of equal ids.
        found.sort_by(PackageDescriptor::cmp_identity);
        found.dedup_by(|later, earlier| later.same_identity(earlier));
        found
    }

    /// Sum of every site's size. Versions present on several sites are
    /// counted once per site.
    pub fn total_size(&self) -> usize {
        self.sites.iter().map(Site::size).sum()
    }

    /// The version of `name` with the highest version code.
    pub fn latest(&self, name: &str) -> Option<PackageDescriptor> {
        self.lookup(name).pop()
    }

    /// The version of `name` whose version name or version code equals
    /// `version`.
    pub fn find(&self, name: &str, version: &str) -> Option<PackageDescriptor> {
        let code = version.parse::<i64>().ok();
        self.lookup(name).into_iter().find(|pkg| {
            pkg.version_name() == version || Some(pkg.version_code()) == code
        })
    }

    /// Every package name known to any site, sorted and unique.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sites.iter().flat_map(Site::names).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Refreshes each site in order. A failing site does not stop the rest.
    pub fn refresh_all<F: Fetcher + ?Sized>(
        &mut self,
        fetcher: &F,
    ) -> Vec<(String, Result<RefreshSummary, FetchError>)> {
        self.sites
            .iter_mut()
            .map(|site| {
                let result = site.refresh(fetcher);
                (site.url().to_string(), result)
            })
            .collect()
    }

    /// Removes every site's cache file.
    pub fn clear_caches(&self) -> Result<(), CacheError> {
        for site in &self.sites {
            site.clear_cache()?;
        }
        Ok(())
    }
}
