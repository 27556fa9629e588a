mod import;
mod query;

use clap::{Args, Parser, Subcommand};
use codenav_core::{CodeNavConfig, Operations};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "codenav",
    version,
    about = "Cross-repository code navigation over precomputed code intelligence indexes",
    long_about = "Answers go-to-definition, find-references, find-implementations, hover and \
                  related queries against uploaded code intelligence indexes, following \
                  package monikers into other repositories when the local index runs out."
)]
pub struct Cli {
    /// JSON configuration file. Environment variables (CODENAV_*) override it.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database to query. Overrides the configuration.
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Mirror logs to stderr.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Repository, commit and path a query is asked about.
#[derive(Args, Debug, Clone)]
pub struct Target {
    #[arg(long)]
    pub repository: i64,
    #[arg(long)]
    pub commit: String,
    #[arg(long)]
    pub path: String,
}

#[derive(Args, Debug, Clone)]
pub struct At {
    #[command(flatten)]
    pub target: Target,
    /// Zero-based line
    #[arg(long)]
    pub line: u32,
    /// Zero-based character
    #[arg(long)]
    pub character: u32,
}

#[derive(Args, Debug, Clone)]
pub struct Page {
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
    /// Token printed by a previous page
    #[arg(long)]
    pub cursor: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Go to definition
    Definitions {
        #[command(flatten)]
        at: At,
        #[command(flatten)]
        page: Page,
    },
    /// Find references, continuing into other repositories
    References {
        #[command(flatten)]
        at: At,
        #[command(flatten)]
        page: Page,
    },
    /// Find implementations
    Implementations {
        #[command(flatten)]
        at: At,
        #[command(flatten)]
        page: Page,
    },
    /// Hover text at a position
    Hover {
        #[command(flatten)]
        at: At,
    },
    /// Every occurrence range of a file
    Stencil {
        #[command(flatten)]
        target: Target,
    },
    /// Code intelligence for occurrences within [start-line, end-line)
    Ranges {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        start_line: u32,
        #[arg(long)]
        end_line: u32,
    },
    /// Packages referenced by the given uploads
    Dependencies {
        #[command(flatten)]
        target: Target,
        #[arg(long = "upload", value_name = "ID", required = true)]
        uploads: Vec<i64>,
    },
    /// Compiler and linter diagnostics reported for a file
    Diagnostics {
        #[command(flatten)]
        target: Target,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Uploads that indexed the file at the commit
    Uploads {
        #[command(flatten)]
        target: Target,
    },
    /// Seed the database from a JSON bundle of uploads and documents
    Import {
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,
    },
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CodeNavConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let component = match &cli.command {
        Commands::Import { .. } => "import",
        _ => "query",
    };
    let _guard = codenav_runtime::init_logging(&config, component, cli.verbose);

    let rt = tokio::runtime::Runtime::new()?;
    let operations = Arc::new(Operations::default());
    let (service, store) = codenav_runtime::build_service(&config, operations.clone())?;

    let output = match cli.command {
        Commands::Import { bundle } => rt.block_on(import::run(&store, &bundle))?,
        command => rt.block_on(query::run(&service, command))?,
    };
    println!("{output}");

    for operation in operations.all() {
        if operation.calls() > 0 {
            tracing::debug!(
                "{}: {} calls, {} errors",
                operation.name(),
                operation.calls(),
                operation.errors()
            );
        }
    }
    Ok(())
}
