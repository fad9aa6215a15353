use clpkg_registry::{descriptor::parse_file, PackageDescriptor, Registry};
use clpkg_utils::path::resolve_path;
use nu_ansi_term::Color::{Blue, Cyan, Green, Magenta, Yellow};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, Style, Width},
};
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult},
    utils::{term_width, Colored, Icons},
};

pub fn query_package(registry: &Registry, name: &str) -> CliResult<()> {
    debug!(query = name, "querying package info");

    let packages = registry.lookup(name);
    if packages.is_empty() {
        return Err(CliError::PackageNotFound(name.to_string()));
    }

    for package in &packages {
        info!(
            package = package.name(),
            version = package.version_name(),
            version_code = package.version_code(),
            build_required = package.is_build_required(),
            "\n{}",
            render_package(package)
        );
    }

    info!(
        "{} version(s) of {} across {} site(s)",
        Colored(Green, packages.len()),
        Colored(Blue, name),
        registry.len()
    );

    Ok(())
}

pub fn inspect_descriptor(path: &str) -> CliResult<()> {
    let path = resolve_path(path)?;
    debug!("inspecting {}", path.display());

    let package = parse_file(&path)?;
    info!(
        package = package.name(),
        version = package.version_name(),
        version_code = package.version_code(),
        "\n{}",
        render_package(&package)
    );
    info!("{} {} is a valid descriptor", Icons::CHECK, path.display());

    Ok(())
}

pub fn render_package(package: &PackageDescriptor) -> String {
    let mut builder = Builder::new();

    builder.push_record([
        format!("{} Name", Icons::PACKAGE),
        Colored(Blue, package.name()).to_string(),
    ]);

    builder.push_record([
        format!("{} Version", Icons::VERSION),
        format!(
            "{} ({})",
            Colored(Blue, package.version_name()),
            Colored(Cyan, package.version_code())
        ),
    ]);

    if let Some(command) = package.build_command() {
        let command = if command.is_empty() {
            Colored(Yellow, "(no command)").to_string()
        } else {
            Colored(Magenta, command).to_string()
        };
        builder.push_record([format!("{} Build", Icons::BUILD), command]);
    }

    if !package.dependencies().is_empty() {
        builder.push_record([
            format!("{} Dependencies", Icons::DEPENDENCY),
            package
                .dependencies()
                .iter()
                .map(|dep| format!("{} {}", Colored(Blue, &dep.name), dep.version))
                .collect::<Vec<_>>()
                .join("\n"),
        ]);
    }

    builder
        .build()
        .with(Style::rounded())
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string()
}
