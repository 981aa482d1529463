//! Profmap CLI - names anonymous frames in profiling traces

#![deny(warnings)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use profmap_core::config::{self, ResolvedConfig};
use profmap_core::{resolve_enclosing_name_with, rewrite_trace_file};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "profmap")]
#[command(about = "Map profiling trace frames back to their original sources")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a trace file against sourcemaps and original sources
    Rewrite {
        /// Trace file to read (JSON array or {"traceEvents": [...]})
        file: PathBuf,

        /// Where to write the rewritten trace
        target: PathBuf,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory relative trace urls resolve against (overrides config file)
        #[arg(long)]
        source_root: Option<PathBuf>,

        /// Bound on syntax tree depth searched (overrides config file)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Process everything on the current thread
        #[arg(long)]
        no_parallel: bool,
    },
    /// Print the name of the declaration enclosing a position
    Lookup {
        /// Source file to parse
        file: PathBuf,

        /// Line (1-indexed)
        line: u32,

        /// Column (0-indexed)
        column: u32,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Bound on syntax tree depth searched (overrides config file)
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Rewrite {
            file,
            target,
            config: config_path,
            source_root,
            max_depth,
            no_parallel,
        } => {
            let mut resolved = load_config(config_path.as_deref())?;

            // CLI flags override config file values
            if let Some(root) = source_root {
                resolved.source_root = Some(root);
            }
            apply_max_depth(&mut resolved, max_depth)?;
            if no_parallel {
                resolved.parallel = false;
            }

            let summary = rewrite_trace_file(&file, &target, &resolved)
                .with_context(|| format!("failed to rewrite {}", file.display()))?;

            eprintln!(
                "{} events: {} relocated, {} renamed, {} left unchanged",
                summary.total, summary.relocated, summary.renamed, summary.skipped
            );
        }
        Commands::Lookup {
            file,
            line,
            column,
            config: config_path,
            max_depth,
        } => {
            let mut resolved = load_config(config_path.as_deref())?;
            apply_max_depth(&mut resolved, max_depth)?;

            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let name = resolve_enclosing_name_with(
                &file.to_string_lossy(),
                &text,
                line,
                column,
                resolved.lookup_options(),
            )?;
            println!("{}", name);
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                match &resolved.source_root {
                    Some(root) => println!("  source_root: {}", root.display()),
                    None => println!("  source_root: (unset)"),
                }
                println!("  max_depth: {}", resolved.max_depth);
                println!("  sentinel: {}", resolved.sentinel);
                println!("  parallel: {}", resolved.parallel);
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    let resolved =
        config::load_and_resolve(&project_root, path).context("failed to load configuration")?;

    if let Some(config_path) = &resolved.config_path {
        tracing::debug!(path = %config_path.display(), "using config");
    }
    Ok(resolved)
}

fn apply_max_depth(resolved: &mut ResolvedConfig, max_depth: Option<usize>) -> anyhow::Result<()> {
    match max_depth {
        Some(0) => anyhow::bail!("--max-depth must be positive"),
        Some(depth) => resolved.max_depth = depth,
        None => {}
    }
    Ok(())
}

/// Initialize tracing subscriber on stderr
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
