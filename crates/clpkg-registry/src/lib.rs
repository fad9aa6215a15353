//! Package descriptors, per-site caches and the multi-site registry view.
//!
//! ```no_run
//! use clpkg_dl::HttpFetcher;
//! use clpkg_registry::Registry;
//!
//! let mut registry = Registry::new(["https://pkgs.example.com"], "/tmp/clpkg-cache");
//! registry.refresh_all(&HttpFetcher);
//! for pkg in registry.lookup("zlib") {
//!     println!("{pkg}");
//! }
//! ```

pub mod cache;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod site;

pub use cache::RegistryCache;
pub use descriptor::{parse_many, parse_one, Dependency, PackageDescriptor, PackageId};
pub use error::{CacheError, FetchError, MalformedDescriptor};
pub use registry::Registry;
pub use site::{RefreshSummary, Site};
