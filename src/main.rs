use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replay_stats::calculate::{
    build_table, entity_profile, maps_table, matches_over_time, overview, role_distribution,
    top_by, GroupKey, Metric,
};
use replay_stats::compare::{
    available_years, compare_across_years, evolution_data, multi_year_metrics, top_changes,
    ChangeDirection, EvolutionMetric,
};
use replay_stats::config::AppConfig;
use replay_stats::highlights::{select_highlights, FlavorSource, RandomFlavor, SeededFlavor};
use replay_stats::models::{ChangeMetric, MatchRecord};
use replay_stats::normalize::{NormalizedDataset, Normalizer};
use replay_stats::storage::jsonl::JsonlWriter;
use replay_stats::storage::{load_raw_records, write_report};

#[derive(Parser)]
#[command(name = "replay-stats")]
#[command(about = "Statistics, leaderboards and highlights from match replay records")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// JSONL file of raw match rows (overrides config)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dataset metadata, overview metrics and role distribution
    Summary,

    /// Leaderboard of heroes or players by a metric
    Rank {
        /// Group by "hero" or "player"
        #[arg(long, default_value = "hero")]
        by: GroupKey,

        /// Metric to rank by (e.g. win_rate_wilson, kda, dpm)
        #[arg(long, default_value = "win_rate_wilson")]
        metric: Metric,

        /// Number of entries to show (default from config)
        #[arg(long)]
        top: Option<usize>,

        /// Skip entities with fewer matches (default from config)
        #[arg(long)]
        min_matches: Option<u32>,

        /// Sort ascending (implied for lower-is-better metrics)
        #[arg(long)]
        ascending: bool,
    },

    /// Full profile of one hero or player
    Profile {
        #[arg(long, default_value = "hero")]
        by: GroupKey,

        name: String,
    },

    /// Three highlight cards for one hero or player
    Highlights {
        #[arg(long, default_value = "hero")]
        by: GroupKey,

        name: String,

        /// Seed flavor text selection for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Years present in the data, with per-year overview metrics
    Years,

    /// Compare heroes or players across years
    Compare {
        #[arg(long, default_value = "hero")]
        by: GroupKey,

        /// Years to compare (e.g. 2024,2025)
        #[arg(long, value_delimiter = ',', required = true)]
        years: Vec<i32>,

        /// Also build improvement and regression leaderboards for this metric
        #[arg(long)]
        metric: Option<ChangeMetric>,

        /// Leaderboard size (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Month-by-month series of a metric, one line per year
    Evolution {
        #[arg(long, value_delimiter = ',', required = true)]
        years: Vec<i32>,

        #[arg(long, default_value = "win_rate")]
        metric: EvolutionMetric,
    },

    /// Normalize raw rows and export them as JSONL
    Normalize {
        /// Destination JSONL file
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(input) = &cli.input {
        config.input = input.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting replay-stats v{}", env!("CARGO_PKG_VERSION"));

    let dataset = load_dataset(&config)?;
    let records = &dataset.records;
    let options = config.rate_options();
    let out = cli.out.as_deref();

    match cli.command {
        Commands::Summary => {
            let report = serde_json::json!({
                "meta": dataset.meta,
                "overview": overview(records),
                "roles": role_distribution(records),
                "maps": maps_table(records),
                "matches_over_time": matches_over_time(records),
            });
            write_report(&report, out)?;
        }

        Commands::Rank {
            by,
            metric,
            top,
            min_matches,
            ascending,
        } => {
            let table = build_table(records, by, &options);
            let top_n = top.unwrap_or(config.stats.default_top_n);
            let min_matches = min_matches.unwrap_or(config.stats.default_min_matches);
            let ascending = ascending || metric.lower_is_better();

            tracing::info!(
                "Ranking {} {}s by {} (top {}, min {} matches)",
                table.len(),
                by,
                metric,
                top_n,
                min_matches
            );

            let ranked = top_by(&table, metric, top_n, min_matches, ascending);
            write_report(&ranked, out)?;
        }

        Commands::Profile { by, name } => {
            let profile = entity_profile(records, &name, by, &options);
            write_report(&profile, out)?;
        }

        Commands::Highlights { by, name, seed } => {
            let flavor: Box<dyn FlavorSource> = match seed {
                Some(seed) => Box::new(SeededFlavor::new(seed)),
                None => Box::new(RandomFlavor),
            };
            let blocks = select_highlights(records, &name, by, flavor.as_ref());
            write_report(&blocks, out)?;
        }

        Commands::Years => {
            let years = available_years(records);
            let report = serde_json::json!({
                "years": years,
                "metrics": multi_year_metrics(records, &years),
            });
            write_report(&report, out)?;
        }

        Commands::Compare {
            by,
            years,
            metric,
            limit,
        } => {
            let entries = compare_across_years(records, &years, by, &options);

            match metric {
                Some(metric) => {
                    let limit = limit.unwrap_or(config.comparison.default_limit);
                    let floor = config.comparison.activity_floor;
                    let report = serde_json::json!({
                        "metric": metric,
                        "improvements": top_changes(&entries, metric, limit, ChangeDirection::Improvements, floor),
                        "regressions": top_changes(&entries, metric, limit, ChangeDirection::Regressions, floor),
                        "entries": entries,
                    });
                    write_report(&report, out)?;
                }
                None => write_report(&entries, out)?,
            }
        }

        Commands::Evolution { years, metric } => {
            let series = evolution_data(records, &years, metric);
            write_report(&series, out)?;
        }

        Commands::Normalize { output } => {
            let writer: JsonlWriter<MatchRecord> = JsonlWriter::new(output);
            writer
                .write_all(records)
                .with_context(|| format!("Failed to write {:?}", writer.path()))?;
            write_report(&dataset.meta, out)?;
        }
    }

    Ok(())
}

/// Read and normalize the configured input file.
fn load_dataset(config: &AppConfig) -> Result<NormalizedDataset> {
    let rows = load_raw_records(&config.input)
        .with_context(|| format!("Failed to read match rows from {:?}", config.input))?;

    let normalizer = Normalizer::new(config.role_table());
    Ok(normalizer.normalize_all(&rows))
}
