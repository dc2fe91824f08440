use anyhow::{Context, Result};
use bulkhasher::BulkHasher;
use bulkhasher::cli::{Cli, Commands};
use bulkhasher::commands::{self, CommandStatus, EXIT_ERROR};
use bulkhasher::config::{Config, validator::ConfigValidator};
use bulkhasher::output::{self, Verbosity};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use std::io;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "BULKHASH_LOG";

fn main() {
    match run() {
        Ok(status) => process::exit(status.code()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(EXIT_ERROR);
        }
    }
}

fn run() -> Result<CommandStatus> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    output::set_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));

    let config_path = cli.config.clone().or_else(Config::default_path);

    match &cli.command {
        Commands::Completion { shell } => {
            print_completions(*shell, &mut Cli::command());
            Ok(CommandStatus::Clean)
        }
        Commands::Config { key, value, list } => {
            let config_path = config_path
                .context("Could not determine a configuration file location")?;
            commands::config::execute(&config_path, key.as_deref(), value.as_deref(), *list)
        }
        Commands::Hash { files } => {
            let hasher = load_hasher(&cli, config_path.as_deref(), false)?;
            commands::hash::execute(&hasher, files)
        }
        Commands::Generate { root, output, sort } => {
            let hasher = load_hasher(&cli, config_path.as_deref(), *sort)?;
            commands::generate::execute(&hasher, root, output.as_deref())
        }
        Commands::Check {
            manifest,
            base_dir,
            strict,
        } => {
            let hasher = load_hasher(&cli, config_path.as_deref(), false)?;
            commands::check::execute(&hasher, manifest.as_deref(), base_dir.as_deref(), *strict)
        }
        Commands::Lookup {
            path,
            manifest,
            last,
        } => {
            let hasher = load_hasher(&cli, config_path.as_deref(), false)?;
            commands::lookup::execute(&hasher, path, manifest.as_deref(), *last)
        }
    }
}

/// Load configuration and apply command-line overrides.
fn load_hasher(cli: &Cli, config_path: Option<&Path>, sort: bool) -> Result<BulkHasher> {
    let mut hasher = match config_path {
        Some(path) => {
            if output::get_verbosity() == Verbosity::Verbose {
                ConfigValidator::new().validate_config_file(path)?;
            }
            BulkHasher::from_config_file(Some(path))
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => BulkHasher::default(),
    };

    if let Some(threads) = cli.threads {
        anyhow::ensure!(threads > 0, "--threads must be at least 1");
        hasher.config.hashing.parallel_threads = threads;
    }
    if sort {
        hasher.config.manifest.sort_paths = true;
    }

    Ok(hasher)
}

/// Route `tracing` events to stderr.
///
/// Diagnostics are already printed by the output module, so only errors are
/// logged unless `BULKHASH_LOG` or `--verbose` asks for more.
fn init_tracing(verbose: bool) {
    let default = if verbose { "bulkhasher=debug" } else { "error" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
