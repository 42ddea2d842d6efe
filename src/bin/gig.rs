//! gig CLI
//!
//! Usage:
//!   gig eval <file>                Evaluate a tunefile and print its result
//!   gig info <name>                Show package metadata
//!   gig fetch <name> [--extract]   Download and verify the source archive
//!   gig search <pattern>           Search available tunes
//!   gig hash <file>                Print the SHA-1 of a file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gig::acquire::{self, Fetcher};
use gig::manifest::{Descriptor, Env, ProcessContext};
use gig::{Config, output, search};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gig")]
#[command(about = "Source package manager driven by tunefiles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: $GIG_CONFIG or <config dir>/gig/gig.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Prefix directory, overriding the config file
    #[arg(short, long, global = true, env = "GIG_PREFIX")]
    prefix: Option<PathBuf>,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a tunefile and print the value of its last form
    Eval {
        /// Path to the tunefile
        file: PathBuf,
    },

    /// Show package metadata
    Info {
        /// Tune name or path to a .tune file
        package: String,
    },

    /// Download and verify a package's source archive
    Fetch {
        /// Tune name or path to a .tune file
        package: String,

        /// Also extract the archive into the source directory
        #[arg(short = 'x', long)]
        extract: bool,
    },

    /// Search available tunes
    Search {
        /// Substring to match against tune names
        #[arg(default_value = "")]
        pattern: String,
    },

    /// Print the SHA-1 checksum of a file
    Hash {
        /// File to hash
        file: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(prefix) = cli.prefix {
        config = with_prefix(config, prefix);
    }

    match cli.command {
        Commands::Eval { file } => {
            let mut env = load_env(&config, cli.quiet)?;
            let value = env
                .evaluate_file(&file)
                .with_context(|| format!("Failed to evaluate {}", file.display()))?;
            println!("{}", value);
        }

        Commands::Info { package } => {
            let (path, descriptor) = load_descriptor(&config, &package, true)?;
            show_info(&path, &descriptor);
        }

        Commands::Fetch { package, extract } => {
            let (_, descriptor) = load_descriptor(&config, &package, cli.quiet)?;
            let layout = config.layout();
            let mut options = config.fetch_options();
            options.show_progress = !cli.quiet;

            output::action(&format!("Fetching {}", descriptor.display_name()));
            let mut fetcher = Fetcher::new(options);
            if extract {
                let tree = fetcher
                    .install_source(&descriptor, &layout)
                    .with_context(|| format!("Failed to install source of {}", descriptor.name))?;
                output::success(&format!("Source ready at {}", tree.source_dir.display()));
            } else {
                let archive = fetcher
                    .fetch(&descriptor, &layout)
                    .with_context(|| format!("Failed to fetch {}", descriptor.name))?;
                output::success(&format!("Fetched {}", archive.display()));
            }
        }

        Commands::Search { pattern } => {
            let hits = search::search(&pattern, &config.tune_paths);
            if hits.is_empty() {
                output::info(&format!("No tunes matching '{}' found", pattern));
            }
            for path in hits {
                let name = search::tune_name(&path).unwrap_or_default();
                output::list_item(&name, &path.display().to_string());
            }
        }

        Commands::Hash { file } => {
            let checksum = acquire::file_checksum(&file)
                .with_context(|| format!("Failed to hash {}", file.display()))?;
            println!("{}  {}", checksum, file.display());
        }
    }

    Ok(())
}

/// Rebuild the config's derived paths under a different prefix.
fn with_prefix(config: Config, prefix: PathBuf) -> Config {
    let rebase = |p: &Path| {
        p.strip_prefix(&config.prefix)
            .map(|rel| prefix.join(rel))
            .unwrap_or_else(|_| p.to_path_buf())
    };
    Config {
        archives_dir: rebase(&config.archives_dir),
        src_dir: rebase(&config.src_dir),
        tune_paths: config.tune_paths.iter().map(|p| rebase(p)).collect(),
        bootstrap_files: config.bootstrap_files.iter().map(|p| rebase(p)).collect(),
        prefix,
        ..config
    }
}

fn load_env(config: &Config, quiet: bool) -> Result<Env> {
    let mut process = ProcessContext::from_current_dir().context("Failed to read current directory")?;
    if quiet {
        process = process.quiet();
    }
    Env::with_bootstrap_files(process, &config.bootstrap_files)
        .context("Failed to evaluate bootstrap tunes")
}

fn load_descriptor(config: &Config, package: &str, quiet: bool) -> Result<(PathBuf, Descriptor)> {
    let path = search::resolve_tune(package, &config.tune_paths)?;
    let mut env = load_env(config, quiet)?;
    env.evaluate_file(&path)
        .with_context(|| format!("Failed to evaluate {}", path.display()))?;
    let descriptor = env
        .descriptor()
        .with_context(|| format!("Invalid package metadata in {}", path.display()))?;
    Ok((path, descriptor))
}

fn show_info(path: &Path, descriptor: &Descriptor) {
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    output::field("Name", &or_dash(&descriptor.name));
    output::field("Version", &or_dash(&descriptor.version));
    output::field("Description", &or_dash(&descriptor.description));
    output::field("License", &or_dash(&descriptor.license));
    if let Some(homepage) = &descriptor.homepage {
        output::field("Homepage", homepage);
    }
    output::field("Source", &or_dash(&descriptor.url));
    output::field("SHA-1", &or_dash(&descriptor.checksum));
    if !descriptor.dependencies.is_empty() {
        output::field("Depends", &descriptor.dependencies.join(", "));
    }
    output::field("Tune", &path.display().to_string());
}
