//! Treeline CLI - Command-line interface for Treeline
//!
//! Produces importance-ranked, size-bounded maps of a repository for tools
//! with strict input limits.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod estimator;

#[derive(Parser)]
#[command(name = "treeline")]
#[command(author = "Treeline Contributors")]
#[command(version)]
#[command(about = "Importance-ranked repository maps under a token budget", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Treeline in a repository
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print a map of the repository
    Map(MapArgs),

    /// List nodes by importance
    Rank {
        /// Repository path (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Number of nodes to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Files to focus on
        #[arg(long, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Symbol names or node paths to treat as important
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Export the reference graph to JSON
    Export {
        /// Output file
        #[arg(short, long, default_value = "treeline-graph.json")]
        output: PathBuf,

        /// Repository path (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// Options of the `map` command. Unset options fall back to the config file.
#[derive(Args)]
pub struct MapArgs {
    /// Repository path (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Files to focus on
    #[arg(long, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Symbol names or node paths to treat as important
    #[arg(long, num_args = 1..)]
    pub symbols: Vec<String>,

    /// Maximum tokens in output [config default: 2000]
    #[arg(short, long, conflicts_with = "unlimited")]
    pub tokens: Option<usize>,

    /// Render without a token limit
    #[arg(long)]
    pub unlimited: bool,

    /// Detail level: structure, signatures, docstrings or full_code
    #[arg(short, long)]
    pub detail: Option<treeline_render::DetailLevel>,

    /// Output format: tree, compact or headed
    #[arg(short, long)]
    pub format: Option<treeline_render::Format>,

    /// Scoring strategy: reference or pagerank
    #[arg(long)]
    pub scorer: Option<treeline_graph::ScorerKind>,

    /// Maximum tree depth to render
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Additional glob patterns to exclude
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Write the map to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Map(args) => commands::map(&args),
        Commands::Rank {
            path,
            top,
            files,
            symbols,
            json,
        } => commands::rank(&path, top, &files, &symbols, json),
        Commands::Export { output, path } => commands::export(&path, &output),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
