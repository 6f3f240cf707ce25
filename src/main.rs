use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use geozones::{
    aggregate::GraphKind,
    config::{ConfigLoader, RunConfig},
    pipeline::Pipeline,
    population::{load_agents, save_agents, PopulationGenerator},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Bin geolocated agents into zones and summarize them")]
struct Cli {
    /// Path to a run config YAML file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assign agents to zones and write the zone report
    Aggregate(AggregateArgs),
    /// Write a synthetic population to a JSON file
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct AggregateArgs {
    /// JSON array of agent records; a synthetic population is used when omitted
    #[arg(long)]
    agents: Option<PathBuf>,

    /// Trait plotted against density
    #[arg(long, value_enum)]
    graph: Option<GraphKind>,

    /// Directory for reports
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Override the synthetic population size
    #[arg(long)]
    count: Option<usize>,

    /// Override the synthetic population seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Destination JSON file
    #[arg(long, default_value = "agents.json")]
    output: PathBuf,

    #[arg(long)]
    count: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(".").load(path)?,
        None => RunConfig::default(),
    };
    init_tracing(&config.logging.level);

    match cli.command {
        Command::Aggregate(args) => {
            if let Some(graph) = args.graph {
                config.graph = graph;
            }
            if let Some(dir) = args.output_dir {
                config.output_dir = dir;
            }
            apply_generator_overrides(&mut config, args.count, args.seed);

            let agents = match &args.agents {
                Some(path) => load_agents(path)?,
                None => PopulationGenerator::new(config.generator.seed)
                    .generate(&config.grid, config.generator.agents),
            };
            let mut pipeline = Pipeline::from_config(&config)?;
            let outcome = pipeline.run(&agents)?;
            let report = &outcome.report;
            println!(
                "Run '{}': {} agents across {} populated zones (of {}); {} plot points",
                report.name,
                report.total_population,
                report.zones.len(),
                report.zone_count,
                report.series.points().count()
            );
            if let Some(path) = outcome.report_path {
                println!("Report written to {}", path.display());
            }
        }
        Command::Generate(args) => {
            apply_generator_overrides(&mut config, args.count, args.seed);
            let agents = PopulationGenerator::new(config.generator.seed)
                .generate(&config.grid, config.generator.agents);
            save_agents(&args.output, &agents)?;
            println!(
                "Wrote {} agents to {}",
                agents.len(),
                args.output.display()
            );
        }
    }
    Ok(())
}

fn apply_generator_overrides(config: &mut RunConfig, count: Option<usize>, seed: Option<u64>) {
    if let Some(count) = count {
        config.generator.agents = count;
    }
    if let Some(seed) = seed {
        config.generator.seed = seed;
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
