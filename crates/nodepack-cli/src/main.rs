#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]

mod commands;
mod logging;

use clap::Parser;
use commands::Context;
use miette::{IntoDiagnostic, Result};
use nodepack_core::config::{ProjectConfig, PACKAGER_ENV};
use nodepack_core::{Config, PackagerId};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nodepack")]
#[command(author, version, about = "Install, prune and inspect production dependencies with npm, yarn or pnpm", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Project root (skips discovery)
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Package manager to use: npm, yarn or pnpm
    #[arg(long, global = true, env = PACKAGER_ENV, value_parser = parse_packager)]
    packager: Option<PackagerId>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Print the project root
    Root,

    /// Show the packager's lockfile and packaging capabilities
    Info,

    /// Print the production dependency tree
    Deps {
        /// Limit the tree to this many levels
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Install dependencies without modifying the lockfile
    Install,

    /// Remove packages not listed as dependencies
    Prune,

    /// Run package.json scripts concurrently
    Run {
        /// Script names
        #[arg(required = true)]
        scripts: Vec<String>,
    },

    /// Rewrite relative `file:` references in a lockfile for a new location
    RebaseLockfile {
        /// Lockfile to rebase
        file: PathBuf,

        /// Path from the new lockfile location back to the package root
        #[arg(long, value_name = "PATH")]
        package_root: String,

        /// Write the result back to FILE instead of printing it
        #[arg(long)]
        write: bool,
    },
}

fn parse_packager(s: &str) -> Result<PackagerId, String> {
    s.parse().map_err(|e: nodepack_core::Error| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().into_diagnostic()?,
    };

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json)
        .with_root(cli.root.clone());

    logging::init(config.verbosity, config.json_logs);

    let command = cli.command.unwrap_or(Commands::Version);
    if let Commands::Version = command {
        return commands::version::run(cli.json);
    }

    // nodepack.json lives in the project root; a missing root is only an
    // error for commands that need one.
    let project = match config.project_root() {
        Ok(root) => match ProjectConfig::load(&root) {
            Ok(project) => project,
            Err(e) => return commands::fail(&e, cli.json),
        },
        Err(_) => None,
    };
    let config = config.merge_project(project, cli.packager);

    let ctx = Context {
        config,
        json: cli.json,
    };
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;

    match command {
        Commands::Version => unreachable!(), // Handled above
        Commands::Root => commands::root::run(&ctx),
        Commands::Info => commands::info::run(&ctx),
        Commands::Deps { depth } => runtime.block_on(commands::deps::run(&ctx, depth)),
        Commands::Install => runtime.block_on(commands::install::install(&ctx)),
        Commands::Prune => runtime.block_on(commands::install::prune(&ctx)),
        Commands::Run { scripts } => runtime.block_on(commands::run::run(&ctx, &scripts)),
        Commands::RebaseLockfile {
            file,
            package_root,
            write,
        } => commands::rebase::run(&ctx, &file, &package_root, write),
    }
}
