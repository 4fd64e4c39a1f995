use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use filter_chain::{
    FilterCatalog, FilterServices, SearchParams, SearchRequest, StaticDirectory, registry,
};
use search_service::{SearchConfig, SearchOrchestrator, SpotView};
use spot_store::{SpotId, SpotIndex, weekday_name, WEEKDAYS};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// spotseek - search campus spots from the command line
#[derive(Parser)]
#[command(name = "spotseek")]
#[command(about = "Search study spots with the configured filter chain", long_about = None)]
struct Cli {
    /// Path to a JSON spot fixture
    #[arg(short, long, default_value = "data/spots.json")]
    data: PathBuf,

    /// JSON file mapping group names to member lists
    #[arg(long)]
    groups: Option<PathBuf>,

    #[command(flatten)]
    search: SearchConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search, e.g. `spotseek search type=study_room capacity=4`
    Search {
        /// Search parameters as key=value; keys may repeat
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Caller identity used by access filters
        #[arg(long)]
        caller: Option<String>,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the loaded filters and the keys they own
    Filters,

    /// Show one spot as JSON
    Show {
        /// Spot ID
        id: SpotId,
    },

    /// Run the same search repeatedly and report latencies
    Benchmark {
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Number of searches to run
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading spots from {}...", cli.data.display());
    let start = Instant::now();
    let index = Arc::new(
        SpotIndex::load_from_file(&cli.data).context("Failed to load spot fixture")?,
    );
    println!(
        "{} Loaded {} spots in {:?}",
        "✓".green(),
        index.len(),
        start.elapsed()
    );

    let orchestrator = build_orchestrator(index, cli.search, cli.groups.as_ref())?;

    match cli.command {
        Commands::Search {
            params,
            caller,
            json,
        } => handle_search(&orchestrator, params, caller, json).await?,
        Commands::Filters => handle_filters(&orchestrator),
        Commands::Show { id } => handle_show(&orchestrator, id)?,
        Commands::Benchmark { params, requests } => {
            handle_benchmark(&orchestrator, params, requests).await?
        }
    }

    Ok(())
}

fn build_orchestrator(
    index: Arc<SpotIndex>,
    config: SearchConfig,
    groups: Option<&PathBuf>,
) -> Result<SearchOrchestrator> {
    let directory = match groups {
        Some(path) => StaticDirectory::load_from_file(path)
            .with_context(|| format!("Failed to load groups from {}", path.display()))?,
        None => StaticDirectory::new(),
    };
    info!("Directory has {} groups", directory.group_count());

    let registry = registry::install(&FilterCatalog::builtin(), &config.filters)
        .context("Failed to load search filters")?;

    Ok(SearchOrchestrator::new(
        index,
        registry,
        FilterServices::new(Arc::new(directory)),
        config,
    ))
}

fn parse_param(arg: &str) -> std::result::Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", arg))
}

fn build_request(params: Vec<(String, String)>, caller: Option<String>) -> SearchRequest {
    let request = SearchRequest::new(SearchParams::from_pairs(params));
    match caller {
        Some(caller) => request.with_caller(caller),
        None => request,
    }
}

/// Handle the 'search' command
async fn handle_search(
    orchestrator: &SearchOrchestrator,
    params: Vec<(String, String)>,
    caller: Option<String>,
    json: bool,
) -> Result<()> {
    let spots = orchestrator
        .search(build_request(params, caller))
        .await
        .map_err(|e| anyhow!("Search failed ({}): {}", e.status_code(), e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&spots)?);
    } else {
        print_spots(&spots);
    }
    Ok(())
}

/// Handle the 'filters' command
fn handle_filters(orchestrator: &SearchOrchestrator) {
    let registry = orchestrator.registry();
    if registry.is_empty() {
        println!("{}", "No filters loaded".yellow());
        return;
    }

    println!("{}", "Loaded filters:".bold().blue());
    for (position, descriptor) in registry.descriptors().iter().enumerate() {
        let keys = if descriptor.keys.is_empty() {
            "(results only)".dimmed().to_string()
        } else {
            descriptor.keys.join(", ")
        };
        println!("{}. {} {}", (position + 1).to_string().green(), descriptor.id, keys);
    }
}

/// Handle the 'show' command
fn handle_show(orchestrator: &SearchOrchestrator, id: SpotId) -> Result<()> {
    let spot = orchestrator
        .fetch(id)?
        .ok_or_else(|| anyhow!("Spot {} not found", id))?;
    println!("{}", serde_json::to_string_pretty(&spot)?);
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: &SearchOrchestrator,
    params: Vec<(String, String)>,
    requests: usize,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }

    let overall = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for _ in 0..requests {
        let orchestrator = orchestrator.clone();
        let request = build_request(params.clone(), None);
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            orchestrator.search(request).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = overall.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p) as usize];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", total / timings.len() as u32);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} searches/second",
        requests as f64 / wall_time.as_secs_f64()
    );
    Ok(())
}

fn print_spots(spots: &[SpotView]) {
    if spots.is_empty() {
        println!("{}", "No spots found".yellow());
        return;
    }

    println!("{}", format!("{} spots:", spots.len()).bold().blue());
    for spot in spots {
        let capacity = spot
            .capacity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{} {} [{}] capacity {} - {}",
            spot.id.to_string().green(),
            spot.name,
            spot.spot_types.join(", "),
            capacity,
            spot.location.building_name
        );
        for day in WEEKDAYS {
            let name = weekday_name(day);
            let windows = spot.available_hours.get(name).map(Vec::as_slice).unwrap_or(&[]);
            if windows.is_empty() {
                continue;
            }
            let hours = windows
                .iter()
                .map(|[start, end]| format!("{}-{}", start, end))
                .collect::<Vec<_>>()
                .join(", ");
            println!("   {}: {}", name, hours);
        }
    }
}
