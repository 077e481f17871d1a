//! CLI command definitions for answer-forge.
//!
//! Each command reads one input file, runs a single analysis and prints the
//! scalar answer (or a JSON object with `--json`).

use crate::cities::{self, CityClusters, SalesQuery};
use crate::config::ResolverConfig;
use crate::logs::{self, ConsumerQuery, LogSource, WindowQuery};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Access-log and sales-data question answering.
#[derive(Parser)]
#[command(name = "answer-forge")]
#[command(about = "Answer data questions over access logs and sales records")]
#[command(version)]
#[command(
    long_about = "answer-forge answers data questions over a single input file.\n\nExample usage:\n  answer-forge logs count --file s-anand.net-May-2024.gz --section telugu --start 05:00 --end 10:00 --weekday Monday\n  answer-forge sales total --file sales.json --city Tokyo --product Pizza --min-units 100"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Analyze a web-server access log.
    Logs(LogsArgs),

    /// Aggregate sales records with phonetic city matching.
    Sales(SalesArgs),
}

/// Access-log entrypoint arguments.
#[derive(Parser, Debug)]
pub struct LogsArgs {
    /// Logs subcommand to run.
    #[command(subcommand)]
    pub command: LogsSubcommand,
}

/// Access-log subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum LogsSubcommand {
    /// Count successful GET requests to a section inside a weekly hour window.
    Count(LogsCountArgs),

    /// Report the bytes downloaded by the heaviest client under a URL prefix on a date.
    TopConsumer(LogsTopConsumerArgs),
}

/// Arguments for `answer-forge logs count`.
#[derive(Parser, Debug)]
pub struct LogsCountArgs {
    /// Access log, gzip-compressed or plain.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Site section, matched as `/<section>/` in the request line (e.g. telugu).
    #[arg(short, long)]
    pub section: String,

    /// Window start, HH:MM (hour inclusive).
    #[arg(long)]
    pub start: String,

    /// Window end, HH:MM (hour exclusive).
    #[arg(long)]
    pub end: String,

    /// Full English weekday name (e.g. Sunday).
    #[arg(short, long)]
    pub weekday: String,

    /// Lowest accepted status code.
    #[arg(long, default_value = "200")]
    pub status_low: u16,

    /// Accepted status codes stop below this value.
    #[arg(long, default_value = "300")]
    pub status_high: u16,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `answer-forge logs top-consumer`.
#[derive(Parser, Debug)]
pub struct LogsTopConsumerArgs {
    /// Access log, gzip-compressed or plain.
    #[arg(short, long)]
    pub file: PathBuf,

    /// URL path prefix (e.g. /telugump3/).
    #[arg(short, long)]
    pub prefix: String,

    /// Date in YYYY-MM-DD.
    #[arg(short, long)]
    pub date: String,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Sales entrypoint arguments.
#[derive(Parser, Debug)]
pub struct SalesArgs {
    /// Sales subcommand to run.
    #[command(subcommand)]
    pub command: SalesSubcommand,
}

/// Sales subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum SalesSubcommand {
    /// Total units of a product sold in a city, merging misspelt city names.
    Total(SalesTotalArgs),

    /// Show how city names were clustered.
    Clusters(SalesClustersArgs),
}

/// Arguments for `answer-forge sales total`.
#[derive(Parser, Debug)]
pub struct SalesTotalArgs {
    /// JSON array or JSON Lines file of {city, product, sales} objects.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Target city (any spelling).
    #[arg(short, long)]
    pub city: String,

    /// Product name.
    #[arg(short, long)]
    pub product: String,

    /// Ignore transactions with fewer units than this.
    #[arg(short, long, default_value = "0")]
    pub min_units: i64,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `answer-forge sales clusters`.
#[derive(Parser, Debug)]
pub struct SalesClustersArgs {
    /// JSON array or JSON Lines file of {city, product, sales} objects.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Logs(args) => run_logs_command(args).await,
        Commands::Sales(args) => run_sales_command(args).await,
    }
}

/// Runs a blocking analysis off the async runtime.
async fn blocking<T, F>(task: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .context("analysis task panicked")?
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Logs Command Implementation
// ============================================================================

async fn run_logs_command(args: LogsArgs) -> anyhow::Result<()> {
    match args.command {
        LogsSubcommand::Count(args) => run_logs_count_command(args).await,
        LogsSubcommand::TopConsumer(args) => run_logs_top_consumer_command(args).await,
    }
}

#[derive(Debug, Clone, Serialize)]
struct CountOutput {
    section: String,
    weekday: String,
    start: String,
    end: String,
    count: u64,
}

async fn run_logs_count_command(args: LogsCountArgs) -> anyhow::Result<()> {
    let query = WindowQuery::new(
        args.section.clone(),
        logs::parse_clock(&args.start)?,
        logs::parse_clock(&args.end)?,
        logs::parse_weekday(&args.weekday)?,
    )
    .with_status_range(args.status_low, args.status_high);

    info!(file = %args.file.display(), section = %query.section, "Counting requests in window");

    let file = args.file.clone();
    let count = blocking(move || {
        let source = LogSource::open(&file)?;
        logs::count_requests_in_window(source, &query)
            .with_context(|| format!("failed to scan {}", file.display()))
    })
    .await?;

    if args.json {
        print_json(&CountOutput {
            section: args.section,
            weekday: args.weekday,
            start: args.start,
            end: args.end,
            count,
        })?;
    } else {
        println!("{count}");
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
struct TopConsumerOutput {
    prefix: String,
    date: String,
    client_address: Option<String>,
    bytes: u128,
}

async fn run_logs_top_consumer_command(args: LogsTopConsumerArgs) -> anyhow::Result<()> {
    let query = ConsumerQuery::new(args.prefix.clone(), logs::parse_date(&args.date)?);

    info!(file = %args.file.display(), prefix = %query.path_prefix, date = %query.date, "Finding top consumer");

    let file = args.file.clone();
    let top = blocking(move || {
        let source = LogSource::open(&file)?;
        logs::top_consumer(source, &query).with_context(|| format!("failed to scan {}", file.display()))
    })
    .await?;

    let bytes = top.as_ref().map_or(0, |t| t.bytes);
    if args.json {
        print_json(&TopConsumerOutput {
            prefix: args.prefix,
            date: args.date,
            client_address: top.map(|t| t.client_address),
            bytes,
        })?;
    } else {
        println!("{bytes}");
    }
    Ok(())
}

// ============================================================================
// Sales Command Implementation
// ============================================================================

async fn run_sales_command(args: SalesArgs) -> anyhow::Result<()> {
    let config = ResolverConfig::from_env().context("invalid resolver configuration")?;
    match args.command {
        SalesSubcommand::Total(args) => run_sales_total_command(args, config).await,
        SalesSubcommand::Clusters(args) => run_sales_clusters_command(args, config).await,
    }
}

#[derive(Debug, Clone, Serialize)]
struct SalesTotalOutput {
    city: String,
    canonical_city: String,
    product: String,
    min_units: i64,
    matched: usize,
    total_units: i128,
}

async fn run_sales_total_command(args: SalesTotalArgs, config: ResolverConfig) -> anyhow::Result<()> {
    let query = SalesQuery::new(args.city.clone(), args.product.clone(), args.min_units);

    info!(file = %args.file.display(), city = %query.city, product = %query.product, "Aggregating sales");

    let file = args.file.clone();
    let outcome = blocking(move || {
        let records = cities::load_sales(&file)?;
        Ok(cities::aggregate(&records, &query, &config))
    })
    .await?;

    if args.json {
        print_json(&SalesTotalOutput {
            city: args.city,
            canonical_city: outcome.canonical_city,
            product: args.product,
            min_units: args.min_units,
            matched: outcome.matched,
            total_units: outcome.total_units,
        })?;
    } else {
        println!("{}", outcome.total_units);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
struct ClusterSummary {
    canonical_name: String,
    representative_code: String,
    members: usize,
}

async fn run_sales_clusters_command(args: SalesClustersArgs, config: ResolverConfig) -> anyhow::Result<()> {
    let file = args.file.clone();
    let clusters = blocking(move || {
        let records = cities::load_sales(&file)?;
        Ok(CityClusters::build(records.iter().map(|r| r.city.as_str()), &config))
    })
    .await?;

    let summaries: Vec<ClusterSummary> = clusters
        .clusters()
        .iter()
        .map(|cluster| ClusterSummary {
            canonical_name: cluster.canonical_name.clone(),
            representative_code: cluster.representative_code.clone(),
            members: cluster.members.len(),
        })
        .collect();

    if args.json {
        print_json(&summaries)?;
    } else {
        for summary in &summaries {
            println!(
                "{}\t{}\t{}",
                summary.canonical_name, summary.representative_code, summary.members
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_logs_count() {
        let cli = Cli::try_parse_from([
            "answer-forge",
            "logs",
            "count",
            "--file",
            "access.log.gz",
            "--section",
            "telugu",
            "--start",
            "05:00",
            "--end",
            "10:00",
            "--weekday",
            "Monday",
        ])
        .unwrap();
        match cli.command {
            Commands::Logs(LogsArgs {
                command: LogsSubcommand::Count(args),
            }) => {
                assert_eq!(args.section, "telugu");
                assert_eq!(args.status_low, 200);
                assert_eq!(args.status_high, 300);
                assert!(!args.json);
            }
            _ => panic!("expected logs count"),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_parse_sales_total_with_global_log_level() {
        let cli = Cli::try_parse_from([
            "answer-forge",
            "sales",
            "total",
            "-f",
            "sales.json",
            "-c",
            "Tokyo",
            "-p",
            "Pizza",
            "-m",
            "100",
            "-j",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Sales(SalesArgs {
                command: SalesSubcommand::Total(args),
            }) => {
                assert_eq!(args.min_units, 100);
                assert!(args.json);
            }
            _ => panic!("expected sales total"),
        }
    }

    #[test]
    fn test_missing_required_argument() {
        assert!(Cli::try_parse_from(["answer-forge", "logs", "top-consumer", "--file", "x.gz"]).is_err());
    }
}
