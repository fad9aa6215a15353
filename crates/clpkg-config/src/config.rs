use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use clpkg_utils::{
    fs::ensure_dir_exists,
    path::{home_dir, resolve_path, xdg_config_home},
    time::parse_duration,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    sites::{collect_site_urls, validate_site_url},
};

pub const DEFAULT_USER_AGENT: &str = concat!("clpkg/", env!("CARGO_PKG_VERSION"));

/// Application configuration.
///
/// Every field is optional in the file; unset values fall back to locations
/// under the clpkg root (`$CLPKG_ROOT`, else `~/.clpkg`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for clpkg state.
    /// Default: $CLPKG_ROOT or ~/.clpkg
    pub root_path: Option<String>,

    /// Directory holding the per-site listing caches.
    /// Default: <root>/.cache
    pub cache_path: Option<String>,

    /// Directory whose files list additional site URLs, one per line.
    /// Default: <root>/sites
    pub sites_path: Option<String>,

    /// Site URLs, queried in this order before the ones in `sites_path`.
    pub sites: Vec<String>,

    /// Global timeout for a single HTTP transfer (e.g. "30s", "2m").
    pub timeout: Option<String>,

    /// User agent sent with every request.
    pub user_agent: Option<String>,
}

/// Location of the configuration file: `$CLPKG_CONFIG`, else
/// `$XDG_CONFIG_HOME/clpkg/config.toml`.
pub fn default_config_path() -> PathBuf {
    match env::var("CLPKG_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => xdg_config_home().join("clpkg").join("config.toml"),
    }
}

impl Config {
    /// Loads the configuration at `path`.
    ///
    /// A missing file yields the default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str::<Config>(&content)?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, using default configuration", path.display());
                Config::default()
            }
            Err(err) => {
                return Err(ConfigError::IoError {
                    action: format!("reading config file {}", path.display()),
                    source: err,
                })
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks values that cannot be expressed in the TOML schema alone.
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = &self.timeout {
            if parse_duration(timeout).is_none() {
                return Err(ConfigError::InvalidTimeout(timeout.clone()));
            }
        }

        for site in &self.sites {
            validate_site_url(site)?;
        }

        Ok(())
    }

    pub fn get_root_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = env::var("CLPKG_ROOT") {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(root_path) = &self.root_path {
            return Ok(resolve_path(root_path)?);
        }
        Ok(home_dir().join(".clpkg"))
    }

    pub fn get_cache_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = env::var("CLPKG_CACHE") {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(cache_path) = &self.cache_path {
            return Ok(resolve_path(cache_path)?);
        }
        Ok(self.get_root_path()?.join(".cache"))
    }

    pub fn get_sites_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = env::var("CLPKG_SITES") {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(sites_path) = &self.sites_path {
            return Ok(resolve_path(sites_path)?);
        }
        Ok(self.get_root_path()?.join("sites"))
    }

    pub fn get_timeout(&self) -> Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|t| parse_duration(t).ok_or_else(|| ConfigError::InvalidTimeout(t.to_string())))
            .transpose()
    }

    pub fn get_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// Returns the ordered, deduplicated list of configured site URLs.
    ///
    /// Inline `sites` come first, followed by the entries found in the sites
    /// directory.
    pub fn site_urls(&self) -> Result<Vec<String>> {
        collect_site_urls(&self.sites, &self.get_sites_path()?)
    }

    /// Per-process scratch directory, `<tmp>/clpkg-<pid>`.
    pub fn temporary_dir(&self) -> PathBuf {
        env::temp_dir().join(format!("clpkg-{}", std::process::id()))
    }

    /// Renders the configuration as commented TOML.
    pub fn to_document(&self) -> Result<String> {
        let body = toml::to_string_pretty(self)?;
        Ok(format!(
            "# clpkg configuration\n\
             #\n\
             # root_path  = \"~/.clpkg\"          # state root\n\
             # cache_path = \"~/.clpkg/.cache\"   # per-site listing caches\n\
             # sites_path = \"~/.clpkg/sites\"    # files listing site URLs, one per line\n\
             # timeout    = \"30s\"               # HTTP transfer timeout\n\
             # user_agent = \"{DEFAULT_USER_AGENT}\"\n\
             \n\
             {body}"
        ))
    }
}

/// Writes a default configuration file to `path`, refusing to overwrite.
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    let document = Config::default().to_document()?;
    fs::write(path, document).map_err(|err| ConfigError::IoError {
        action: format!("writing config file {}", path.display()),
        source: err,
    })?;

    info!("Default configuration file generated at: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::{with_env, without_env};

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
cache_path = "/var/cache/clpkg"
sites = ["https://a.example/registry", "https://b.example"]
timeout = "30s"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache_path.as_deref(), Some("/var/cache/clpkg"));
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.get_timeout().unwrap(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "sites = [").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    fn test_validate_timeout() {
        let config = Config {
            timeout: Some("soon".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_validate_site_urls() {
        let config = Config {
            sites: vec!["not a url".to_string()],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSiteUrl { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_paths_derive_from_root() {
        without_env(&["CLPKG_CACHE", "CLPKG_SITES"], || {
            with_env(vec![("CLPKG_ROOT", "/opt/clpkg")], || {
                let config = Config::default();
                assert_eq!(config.get_root_path().unwrap(), PathBuf::from("/opt/clpkg"));
                assert_eq!(
                    config.get_cache_path().unwrap(),
                    PathBuf::from("/opt/clpkg/.cache")
                );
                assert_eq!(
                    config.get_sites_path().unwrap(),
                    PathBuf::from("/opt/clpkg/sites")
                );
            });
        });
    }

    #[test]
    #[serial]
    fn test_default_root_is_under_home() {
        without_env(&["CLPKG_ROOT"], || {
            with_env(vec![("HOME", "/tmp/home")], || {
                let config = Config::default();
                assert_eq!(
                    config.get_root_path().unwrap(),
                    PathBuf::from("/tmp/home/.clpkg")
                );
            });
        });
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_values() {
        with_env(vec![("CLPKG_CACHE", "/custom/cache")], || {
            let config = Config {
                cache_path: Some("/from/file".to_string()),
                ..Config::default()
            };
            assert_eq!(
                config.get_cache_path().unwrap(),
                PathBuf::from("/custom/cache")
            );
        });
    }

    #[test]
    fn test_user_agent_default() {
        let config = Config::default();
        assert!(config.get_user_agent().starts_with("clpkg/"));
    }

    #[test]
    fn test_temporary_dir_is_per_process() {
        let dir = Config::default().temporary_dir();
        assert!(dir
            .to_string_lossy()
            .ends_with(&format!("clpkg-{}", std::process::id())));
    }

    #[test]
    fn test_generate_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        generate_default_config(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        assert!(matches!(
            generate_default_config(&path),
            Err(ConfigError::ConfigAlreadyExists(_))
        ));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config {
            sites: vec!["https://a.example".to_string()],
            timeout: Some("1m".to_string()),
            ..Config::default()
        };
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
