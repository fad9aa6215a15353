//! Error types for the registry crate.
//!
//! Three kinds of failure are kept apart: a document that does not describe
//! a package ([`MalformedDescriptor`]), a listing that could not be obtained
//! from a site ([`FetchError`]), and a cache file that could not be read or
//! written ([`CacheError`]).

use std::path::PathBuf;

use clpkg_dl::DownloadError;
use clpkg_utils::error::FileSystemError;
use miette::Diagnostic;
use thiserror::Error;

/// A document failed descriptor validation.
///
/// When the document was one entry of a listing, `index` is its position and
/// `name` its package name (if it had a usable one).
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("Malformed package descriptor{}: {reason}", location(.index, .name))]
#[diagnostic(
    code(clpkg_registry::malformed_descriptor),
    help("Descriptors need a non-empty `name` and a `version` with a string `name` and an integer `code`")
)]
pub struct MalformedDescriptor {
    pub index: Option<usize>,
    pub name: Option<String>,
    pub reason: String,
}

fn location(index: &Option<usize>, name: &Option<String>) -> String {
    match (index, name) {
        (Some(index), Some(name)) => format!(" at index {index} (`{name}`)"),
        (Some(index), None) => format!(" at index {index}"),
        (None, Some(name)) => format!(" `{name}`"),
        (None, None) => String::new(),
    }
}

impl MalformedDescriptor {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            index: None,
            name: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn at(mut self, index: usize, name: Option<String>) -> Self {
        self.index = Some(index);
        self.name = name;
        self
    }
}

/// Failure reading or writing a site's cache file.
#[derive(Error, Diagnostic, Debug)]
pub enum CacheError {
    #[error("Cache file {} does not exist", .0.display())]
    #[diagnostic(code(clpkg_registry::cache_missing))]
    Missing(PathBuf),

    #[error(transparent)]
    #[diagnostic(
        code(clpkg_registry::cache_io),
        help("Check permissions on the cache directory")
    )]
    Io(#[from] FileSystemError),

    #[error("Cache file {} is corrupt: {source}", .path.display())]
    #[diagnostic(
        code(clpkg_registry::cache_corrupt),
        help("Run `clpkg sync` to replace it")
    )]
    Corrupt {
        path: PathBuf,
        #[source]
        source: MalformedDescriptor,
    },
}

/// Failure refreshing a site from the network.
#[derive(Error, Diagnostic, Debug)]
pub enum FetchError {
    #[error("Failed to fetch package listing from {url}")]
    #[diagnostic(
        code(clpkg_registry::network),
        help("Check your network connection and the site URL")
    )]
    Network {
        url: String,
        #[source]
        source: DownloadError,
    },

    #[error("Site {url} served an invalid package listing")]
    #[diagnostic(
        code(clpkg_registry::malformed_listing),
        help("The site's listing must be a JSON array of package descriptors")
    )]
    Malformed {
        url: String,
        #[source]
        source: MalformedDescriptor,
    },
}
