use anyhow::{anyhow, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use sense_graph::{CancellationToken, Disambiguator, NoopObserver, SenseSource};
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod flags;
mod input;
mod report;

use config::ConfigOverrides;
use flags::NetworkFormat;
use report::{ContextOutput, NetworkStats};

#[derive(Parser)]
#[command(name = "sense-finder")]
#[command(about = "Graph-based word sense disambiguation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign a sense to every term of every context
    Disambiguate(DisambiguateArgs),

    /// Print size of the loaded sense network
    Stats(NetworkArgs),
}

#[derive(Args)]
struct NetworkArgs {
    /// Sense network: JSON document or TSV relation list
    #[arg(long)]
    network: PathBuf,

    /// TSV lexicon (term, pos, comma-separated senses); required for TSV networks
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Network file format
    #[arg(long, value_enum, default_value = "auto")]
    format: NetworkFormat,
}

#[derive(Args)]
struct DisambiguateArgs {
    #[command(flatten)]
    network: NetworkArgs,

    /// JSON array of contexts: [{"id": "...", "terms": [{"term": "...", "pos": "n"}]}]
    #[arg(long)]
    contexts: PathBuf,

    /// TOML config file (overrides SENSE_FINDER_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum path length between candidate senses
    #[arg(long)]
    max_depth: Option<usize>,

    /// Minimum degree for a sense to be selected
    #[arg(long)]
    min_degree: Option<usize>,

    /// Cap on edges per disambiguation graph
    #[arg(long)]
    max_edges: Option<usize>,

    /// Cap on search steps per context
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Wall-clock budget per context in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Also write a markdown summary to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Disambiguate(args) => run_disambiguate(args).await?,
        Commands::Stats(args) => run_stats(args)?,
    }

    Ok(())
}

fn run_stats(args: NetworkArgs) -> Result<()> {
    let source = input::load_source(&args.network, args.lexicon.as_deref(), args.format)?;
    let network = source.network();
    let stats = NetworkStats {
        senses: network.node_count(),
        relations: network.edge_count(),
        lexicon_entries: source.lexicon_len(),
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

async fn run_disambiguate(args: DisambiguateArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        max_depth: args.max_depth,
        min_degree: args.min_degree,
        max_edges: args.max_edges,
        max_expansions: args.max_expansions,
        timeout_ms: args.timeout_ms,
    };
    let config = config::load_config(args.config.as_deref(), &overrides)?;
    let contexts = input::read_contexts(&args.contexts)?;

    let network = &args.network;
    let source: Arc<dyn SenseSource> = Arc::new(input::load_source(
        &network.network,
        network.lexicon.as_deref(),
        network.format,
    )?);
    let disambiguator = Disambiguator::new(source, config)?;

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted, cancelling running sessions");
                cancel.cancel();
            }
        })
    };

    // Sessions share only the read-only network; each runs on its own blocking task
    let handles: Vec<_> = contexts
        .into_iter()
        .map(|context| {
            let disambiguator = disambiguator.clone();
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                let report = disambiguator
                    .disambiguate_with(&context.terms, &mut NoopObserver, Some(cancel))
                    .with_context(|| format!("Context {} failed", context.id))?;
                Ok::<_, anyhow::Error>(ContextOutput::from_report(context.id, &report))
            })
        })
        .collect();

    let mut outputs = Vec::with_capacity(handles.len());
    for handle in handles {
        let output = handle
            .await
            .map_err(|e| anyhow!("Disambiguation task panicked: {e}"))??;
        outputs.push(output);
    }
    interrupt.abort();

    if let Some(path) = &args.report {
        std::fs::write(path, report::render_summary(&outputs))
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&outputs)?);
    Ok(())
}
