use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "clpkg: C/C++ Libraries Package manager",
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install library
    #[command(arg_required_else_help = true)]
    #[clap(name = "install", visible_alias = "i", visible_alias = "add")]
    Install {
        /// Packages to install, as `name` or `name@version`
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Uninstall library
    #[command(arg_required_else_help = true)]
    #[clap(name = "uninstall", visible_alias = "remove", visible_alias = "r")]
    Uninstall {
        /// Packages to uninstall
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Fetch package listings from every configured site
    #[clap(name = "sync", visible_alias = "S", visible_alias = "fetch")]
    Sync,

    /// Show every known version of a package
    #[command(arg_required_else_help = true)]
    #[clap(name = "query", visible_alias = "Q")]
    Query {
        /// Package name
        #[arg(required = true)]
        package: String,
    },

    /// Validate and show a descriptor file
    #[command(arg_required_else_help = true)]
    #[clap(name = "inspect")]
    Inspect {
        /// Path to a package descriptor document
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        path: String,
    },

    /// List configured sites
    #[clap(name = "sites")]
    Sites,

    /// View env
    #[clap(name = "env")]
    Env,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// Remove cached site listings
    #[clap(name = "clean")]
    Clean,
}
