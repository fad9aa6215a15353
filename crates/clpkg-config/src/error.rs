use std::path::PathBuf;

use clpkg_utils::error::{FileSystemError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(clpkg_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(clpkg_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists: {}", .0.display())]
    #[diagnostic(
        code(clpkg_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists(PathBuf),

    #[error("Invalid timeout: {0}")]
    #[diagnostic(
        code(clpkg_config::invalid_timeout),
        help("Use a duration such as `30s`, `2m` or `1h30m`")
    )]
    InvalidTimeout(String),

    #[error("Invalid site URL `{url}`: {reason}")]
    #[diagnostic(
        code(clpkg_config::invalid_site_url),
        help("Each site must be an absolute URL such as `https://example.com/registry`")
    )]
    InvalidSiteUrl { url: String, reason: String },

    #[error("Error while {action}: {source}")]
    #[diagnostic(code(clpkg_config::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(clpkg_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
