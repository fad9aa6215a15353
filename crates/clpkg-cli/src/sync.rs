use clpkg_dl::Fetcher;
use clpkg_registry::Registry;
use clpkg_utils::fs::safe_remove;
use nu_ansi_term::Color::{Blue, Green, Red, Yellow};
use tracing::{error, info, warn};

use crate::{
    error::{CliError, CliResult},
    utils::{Colored, Icons},
};

/// Refreshes every site, reporting each one. Fails if any site failed.
pub fn sync_sites<F: Fetcher + ?Sized>(registry: &mut Registry, fetcher: &F) -> CliResult<()> {
    if registry.is_empty() {
        return Err(CliError::NoSites);
    }

    let results = registry.refresh_all(fetcher);
    let total = results.len();
    let mut failed = 0;

    for (url, result) in results {
        match result {
            Ok(summary) => {
                info!(
                    "{} {} ({} packages)",
                    Colored(Green, Icons::CHECK),
                    Colored(Blue, &url),
                    summary.packages
                );
                if let Some(err) = summary.cache_error {
                    warn!("{} was not cached: {}", url, err);
                }
            }
            Err(err) => {
                failed += 1;
                error!("{} {}: {}", Colored(Red, Icons::CROSS), url, err);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::SyncFailed {
            failed,
            total,
        });
    }

    info!("{} site(s) synced, {} packages", total, registry.total_size());
    Ok(())
}

pub fn list_sites(registry: &Registry) {
    if registry.is_empty() {
        warn!("No sites configured");
        return;
    }

    for (position, site) in registry.sites().iter().enumerate() {
        let status = if site.size() > 0 {
            Colored(Green, format!("{} packages", site.size())).to_string()
        } else {
            Colored(Yellow, "not synced").to_string()
        };
        info!(
            url = site.url(),
            packages = site.size(),
            "{}. {} {}",
            position + 1,
            Colored(Blue, site.url()),
            status
        );
    }
}

/// Removes every cached listing, including those of sites no longer
/// configured.
pub fn clean_cache(registry: &Registry, cache_root: &std::path::Path) -> CliResult<()> {
    registry.clear_caches()?;
    let sites_dir = clpkg_registry::RegistryCache::new(cache_root).sites_dir();
    safe_remove(&sites_dir)?;
    info!("Removed {}", sites_dir.display());
    Ok(())
}
