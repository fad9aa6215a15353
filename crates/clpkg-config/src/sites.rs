//! Site list assembly.
//!
//! Sites come from two places: the inline `sites` array of the config file
//! and a directory in which every regular file lists site URLs, one per line.
//! Blank lines and lines starting with `#` are ignored.

use std::{collections::HashSet, fs, path::Path};

use clpkg_utils::fs::list_files;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ConfigError, Result};

/// Checks that `site` is an absolute URL.
pub fn validate_site_url(site: &str) -> Result<()> {
    Url::parse(site).map(|_| ()).map_err(|err| {
        ConfigError::InvalidSiteUrl {
            url: site.to_string(),
            reason: err.to_string(),
        }
    })
}

/// Reads the site URLs listed in a single site file.
pub fn read_site_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|err| {
        ConfigError::IoError {
            action: format!("reading site file {}", path.display()),
            source: err,
        }
    })?;

    let urls = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect::<Vec<_>>();

    for url in &urls {
        validate_site_url(url)?;
    }

    Ok(urls)
}

/// Merges inline sites with the contents of `sites_dir`.
///
/// Order is inline entries first, then directory files by file name, each
/// file's lines in order. Repeated URLs keep their first position.
pub fn collect_site_urls(inline: &[String], sites_dir: &Path) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for site in inline {
        validate_site_url(site)?;
        if seen.insert(site.clone()) {
            urls.push(site.clone());
        }
    }

    for file in list_files(sites_dir)? {
        debug!("reading sites from {}", file.display());
        for site in read_site_file(&file)? {
            if seen.insert(site.clone()) {
                urls.push(site);
            } else {
                warn!("Ignoring duplicate site {} in {}", site, file.display());
            }
        }
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_collect_inline_only() {
        let dir = tempdir().unwrap();
        let inline = vec![
            "https://a.example".to_string(),
            "https://b.example".to_string(),
            "https://a.example".to_string(),
        ];

        let urls = collect_site_urls(&inline, &dir.path().join("missing")).unwrap();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_collect_merges_directory_in_file_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("20-extra"),
            "# comment\nhttps://c.example\n\nhttps://a.example\n",
        )
        .unwrap();
        fs::write(dir.path().join("10-main"), "https://b.example\n").unwrap();

        let inline = vec!["https://a.example".to_string()];
        let urls = collect_site_urls(&inline, dir.path()).unwrap();
        assert_eq!(
            urls,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn test_invalid_site_in_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad"), "not a url\n").unwrap();

        assert!(matches!(
            collect_site_urls(&[], dir.path()),
            Err(ConfigError::InvalidSiteUrl { .. })
        ));
    }

    #[test]
    fn test_sites_path_is_a_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("sites");
        fs::write(&file, "").unwrap();

        assert!(matches!(
            collect_site_urls(&[], &file),
            Err(ConfigError::Utils(_))
        ));
    }
}
