use clap::{Parser, Subcommand};
use cli::analyze_directory;
use color_eyre::eyre::Result;
use flag_features::{AnalysisConfig, FeatureStore, FlagAnalysisEngine, PatternKind, SymbolicTable};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse every flag image in a directory and update the feature store
    Analyze {
        /// Directory of flag images (`<code>_flag.<ext>`)
        #[arg(short, long)]
        input: PathBuf,
        /// Feature store document to create or update
        #[arg(short, long)]
        store: PathBuf,
        /// Analysis configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON table of symbolic annotations keyed by identifier
        #[arg(long)]
        symbolic: Option<PathBuf>,
    },
    /// List identifiers matching a colour or a pattern
    Query {
        /// Feature store document
        #[arg(short, long)]
        store: PathBuf,
        /// Colour category, e.g. red
        #[arg(long, conflicts_with = "pattern", required_unless_present = "pattern")]
        color: Option<String>,
        /// One of stripes, bands, stars, cross, circle
        #[arg(long)]
        pattern: Option<String>,
    },
    /// Print the JSON schema of the feature store document
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze { input, store, config, symbolic } => {
            analyze(input, store, config.as_deref(), symbolic.as_deref())?;
        }
        Commands::Query { store, color, pattern } => {
            query(store, color.as_deref(), pattern.as_deref())?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&FeatureStore::schema())?);
        }
    }

    Ok(())
}

fn analyze(input: &Path, store: &Path, config: Option<&Path>, symbolic: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    let mut builder = FlagAnalysisEngine::builder().with_config(config);
    if let Some(path) = symbolic {
        let table = SymbolicTable::from_json_file(path)?;
        info!("Loaded {} symbolic annotations", table.len());
        builder = builder.with_symbolic_lookup(Arc::new(table));
    }
    let engine = builder.build()?;
    info!("{}", engine.info());

    let report = analyze_directory(&engine, input, store)?;
    for (identifier, error) in &report.failures {
        warn!("{}: {}", identifier, error);
    }
    info!(
        "✅ {} flags written to {} ({} failed)",
        report.records.len(),
        store.display(),
        report.failures.len()
    );
    Ok(())
}

fn query(store: &Path, color: Option<&str>, pattern: Option<&str>) -> Result<()> {
    let store = FeatureStore::open(store)?;
    let matches = match (color, pattern) {
        (Some(color), _) => store.query_by_color(color),
        (None, Some(pattern)) => store.query_by_pattern(PatternKind::parse(pattern)?),
        (None, None) => Vec::new(),
    };

    info!("{} matching flags", matches.len());
    for identifier in matches {
        println!("{identifier}");
    }
    Ok(())
}
