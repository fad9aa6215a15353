use std::path::PathBuf;

use clap::Parser;
use cli::{Args, Commands};
use clpkg_config::config::{default_config_path, generate_default_config, Config};
use clpkg_dl::{
    http_client::{configure_http_client, parse_headers, parse_proxy},
    HttpFetcher,
};
use clpkg_registry::Registry;
use clpkg_utils::path::resolve_path;
use error::CliResult;
use install::{install_packages, uninstall_packages};
use logging::setup_logging;
use query::{inspect_descriptor, query_package};
use sync::{clean_cache, list_sites, sync_sites};
use tracing::{debug, info};
use utils::{set_color, TempDirGuard};

mod cli;
mod error;
mod install;
mod logging;
mod query;
mod sync;
mod utils;

/// `--config` when given, resolved against the working directory, else the
/// default location.
fn config_path(args: &Args) -> CliResult<PathBuf> {
    match args.config {
        Some(ref c) => Ok(resolve_path(c)?),
        None => Ok(default_config_path()),
    }
}

fn configure_transport(args: &Args, config: &Config) -> CliResult<()> {
    let proxy = args.proxy.as_deref().map(parse_proxy).transpose()?;
    let headers = args.header.as_deref().map(parse_headers).transpose()?;
    let user_agent = args
        .user_agent
        .clone()
        .unwrap_or_else(|| config.get_user_agent());
    let timeout = config.get_timeout()?;

    configure_http_client(|cfg| {
        if proxy.is_some() {
            cfg.proxy = proxy;
        }
        if headers.is_some() {
            cfg.headers = headers;
        }
        cfg.user_agent = Some(user_agent);
        cfg.timeout = timeout;
    });

    Ok(())
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    if args.no_color {
        set_color(false);
    }

    setup_logging(&args);

    let config_path = config_path(&args)?;

    if let Commands::DefConfig = args.command {
        generate_default_config(&config_path)?;
        return Ok(());
    }

    if let Commands::Inspect {
        ref path,
    } = args.command
    {
        return inspect_descriptor(path);
    }

    let config = Config::load(&config_path)?;
    configure_transport(&args, &config)?;

    let _scratch = TempDirGuard::create(config.temporary_dir())?;
    let mut registry = Registry::from_config(&config)?;
    debug!(
        "{} site(s), {} cached packages",
        registry.len(),
        registry.total_size()
    );

    match args.command {
        Commands::Install {
            packages,
        } => install_packages(&registry, &packages)?,
        Commands::Uninstall {
            packages,
        } => uninstall_packages(&registry, &packages)?,
        Commands::Sync => sync_sites(&mut registry, &HttpFetcher)?,
        Commands::Query {
            package,
        } => query_package(&registry, &package)?,
        Commands::Sites => list_sites(&registry),
        Commands::Env => {
            info!("CLPKG_CONFIG={}", config_path.display());
            info!("CLPKG_ROOT={}", config.get_root_path()?.display());
            info!("CLPKG_CACHE={}", config.get_cache_path()?.display());
            info!("CLPKG_SITES={}", config.get_sites_path()?.display());
        }
        Commands::Clean => clean_cache(&registry, &config.get_cache_path()?)?,
        Commands::DefConfig
        | Commands::Inspect {
            ..
        } => {}
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
