use clpkg_config::error::ConfigError;
use clpkg_dl::DownloadError;
use clpkg_registry::{CacheError, FetchError, MalformedDescriptor};
use clpkg_utils::error::{FileSystemError, PathError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Descriptor(#[from] MalformedDescriptor),

    #[error(transparent)]
    #[diagnostic(code(clpkg::fs), help("Check file permissions and disk space"))]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(code(clpkg::path))]
    Path(#[from] PathError),

    #[error("Package '{0}' not found")]
    #[diagnostic(
        code(clpkg::package_not_found),
        help("Run 'clpkg sync' to update package listings, or check the package name")
    )]
    PackageNotFound(String),

    #[error("No sites configured")]
    #[diagnostic(
        code(clpkg::no_sites),
        help("Add site URLs to `sites` in the config file or to a file in the sites directory")
    )]
    NoSites,

    #[error("{failed} of {total} sites failed to sync")]
    #[diagnostic(code(clpkg::sync_failed))]
    SyncFailed { failed: usize, total: usize },
}

pub type CliResult<T> = std::result::Result<T, CliError>;
