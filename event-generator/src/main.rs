use anyhow::Result;
use clap::Parser;
use common::{EventCategory, GeneratorConfig};
use event_generator::{
    sampler::time_seed, Dispatcher, HttpDispatcher, LogDispatcher, RunStats, StreamOrchestrator,
    TracingProgress,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CONFIG_CANDIDATES: [&str; 2] = ["config/generator.toml", "../config/generator.toml"];

#[derive(Parser)]
#[command(name = "event-generator")]
#[command(about = "Synthetic categorized event traffic generator")]
#[command(version)]
struct Cli {
    /// Config file (defaults to config/generator.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Events per category, overriding the config
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Delay after each event in milliseconds, for every category
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Run seed for urgency sampling
    #[arg(short, long)]
    seed: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Only generate these categories (repeatable)
    #[arg(long = "only")]
    only: Vec<EventCategory>,

    /// Log events instead of sending them
    #[arg(long)]
    dry_run: bool,
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    if let Some(path) = path {
        return GeneratorConfig::load(path);
    }
    match CONFIG_CANDIDATES.iter().map(Path::new).find(|p| p.exists()) {
        Some(path) => {
            info!("Loading config from {:?}", path);
            GeneratorConfig::load(path)
        }
        None => {
            info!("No config file found, using defaults");
            Ok(GeneratorConfig::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    info!("Starting Event Generator");

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(count) = cli.count {
        config.set_count(count);
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.set_delay_ms(delay_ms);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.debug_print();

    let dispatcher: Arc<dyn Dispatcher> = if cli.dry_run {
        info!("Dry run, events are logged instead of sent");
        Arc::new(LogDispatcher)
    } else {
        Arc::new(HttpDispatcher::new(config.endpoint.clone(), config.timeout())?)
    };

    let stats = Arc::new(RunStats::new());
    let progress = Arc::new((TracingProgress::new(config.log_every), stats.clone()));
    let run_seed = config.seed.unwrap_or_else(time_seed);

    let orchestrator = StreamOrchestrator::from_config(&config, dispatcher, progress, run_seed)?;
    let categories = if cli.only.is_empty() {
        EventCategory::ALL.to_vec()
    } else {
        cli.only
    };
    orchestrator.run_all(&categories).await;

    stats.print_summary();
    info!("Event Generator finished");
    Ok(())
}
