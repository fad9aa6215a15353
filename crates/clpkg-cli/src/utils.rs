use std::{
    fmt::Display,
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
};

use clpkg_utils::fs::{ensure_dir_exists, safe_remove};
use nu_ansi_term::Color;
use tracing::{debug, warn};

use crate::error::CliResult;

pub struct Icons;

impl Icons {
    pub const ARROW: &str = "→";
    pub const BUILD: &str = "🔨";
    pub const CHECK: &str = "✓";
    pub const CROSS: &str = "✗";
    pub const DEPENDENCY: &str = "🔗";
    pub const PACKAGE: &str = "📦";
    pub const VERSION: &str = "🏁";
}

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn set_color(enabled: bool) {
    *COLOR.write().unwrap_or_else(PoisonError::into_inner) = enabled;
}

pub fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap_or_else(PoisonError::into_inner);
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Splits `name@version` into its parts.
pub fn parse_package_spec(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once('@') {
        Some((name, version)) if !version.is_empty() => (name, Some(version)),
        Some((name, _)) => (name, None),
        None => (spec, None),
    }
}

/// Scratch directory that lives as long as the guard.
pub struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    pub fn create<P: Into<PathBuf>>(path: P) -> CliResult<Self> {
        let path = path.into();
        ensure_dir_exists(&path)?;
        debug!("created temporary directory {}", path.display());
        Ok(Self {
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        if let Err(err) = safe_remove(&self.path) {
            warn!("failed to remove {}: {}", self.path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_spec() {
        assert_eq!(parse_package_spec("zlib"), ("zlib", None));
        assert_eq!(parse_package_spec("zlib@1.3"), ("zlib", Some("1.3")));
        assert_eq!(parse_package_spec("zlib@"), ("zlib", None));
    }

    #[test]
    fn test_temp_dir_guard_removes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("clpkg-scratch");

        let guard = TempDirGuard::create(&scratch).unwrap();
        std::fs::write(guard.path().join("file"), b"x").unwrap();
        assert!(scratch.is_dir());

        drop(guard);
        assert!(!scratch.exists());
    }

    #[test]
    fn test_colored_plain() {
        set_color(false);
        assert_eq!(Colored(Color::Red, "zlib").to_string(), "zlib");
        set_color(true);
    }
}
