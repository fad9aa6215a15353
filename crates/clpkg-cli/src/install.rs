use clpkg_registry::{PackageDescriptor, Registry};
use nu_ansi_term::Color::{Blue, Cyan, Magenta};
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult},
    utils::{parse_package_spec, Colored, Icons},
};

/// Resolves a `name` or `name@version` spec against the registry.
///
/// Without a version the latest one is picked; a version matches either the
/// version name or the numeric version code.
pub fn resolve_spec(registry: &Registry, spec: &str) -> CliResult<PackageDescriptor> {
    let (name, version) = parse_package_spec(spec);

    let found = match version {
        Some(version) => registry.find(name, version),
        None => registry.latest(name),
    };

    found.ok_or_else(|| CliError::PackageNotFound(spec.to_string()))
}

pub fn install_packages(registry: &Registry, specs: &[String]) -> CliResult<()> {
    let resolved = specs
        .iter()
        .map(|spec| resolve_spec(registry, spec))
        .collect::<CliResult<Vec<_>>>()?;

    for package in &resolved {
        debug!(package = package.name(), version_code = package.version_code(), "resolved");
        info!(
            "{} {} {}",
            Icons::ARROW,
            Colored(Blue, package.name()),
            Colored(Cyan, package.version_name())
        );

        if let Some(command) = package.build_command() {
            info!("  {} build: {}", Icons::BUILD, Colored(Magenta, command));
        }

        for dep in package.dependencies() {
            info!("  {} requires {} {}", Icons::DEPENDENCY, dep.name, dep.version);
        }
    }

    info!("Resolved {} package(s)", resolved.len());
    Ok(())
}

pub fn uninstall_packages(registry: &Registry, specs: &[String]) -> CliResult<()> {
    for spec in specs {
        let package = resolve_spec(registry, spec)?;
        info!(
            "{} {} {}",
            Icons::CROSS,
            Colored(Blue, package.name()),
            Colored(Cyan, package.version_name())
        );
    }

    info!("Resolved {} package(s)", specs.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clpkg_registry::Site;

    use super::*;

    fn registry(dir: &std::path::Path) -> Registry {
        let url = "https://a.example";
        let cache = clpkg_registry::RegistryCache::new(dir);
        cache
            .write(
                url,
                br#"[{"name":"zlib","version":{"name":"1.2","code":120}},
                     {"name":"zlib","version":{"name":"1.3","code":130}}]"#,
            )
            .unwrap();
        Registry::from_sites(vec![Site::with_cache(url, cache)])
    }

    #[test]
    fn test_resolve_spec() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        assert_eq!(resolve_spec(&registry, "zlib").unwrap().version_code(), 130);
        assert_eq!(resolve_spec(&registry, "zlib@1.2").unwrap().version_code(), 120);
        assert_eq!(resolve_spec(&registry, "zlib@120").unwrap().version_name(), "1.2");
        assert!(matches!(
            resolve_spec(&registry, "zlib@9"),
            Err(CliError::PackageNotFound(_))
        ));
        assert!(resolve_spec(&registry, "curl").is_err());
    }

    #[test]
    fn test_install_fails_on_unknown_package() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        assert!(install_packages(&registry, &["zlib".to_string()]).is_ok());
        assert!(install_packages(&registry, &["zlib".to_string(), "nope".to_string()]).is_err());
        assert!(uninstall_packages(&registry, &["nope".to_string()]).is_err());
    }
}
