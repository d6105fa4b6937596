//! Traveller CLI - trend analysis and stats store management.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use traveller::charts::{PlotOptions, TrendPlotter};
use traveller::data::{analyze_file, analyze_files, merge_outcomes, YearFile};
use traveller::registry::ModelRegistry;
use traveller::stats::StatsCalculator;
use traveller::store::{self, ArrivalStore};
use traveller::Config;

#[derive(Parser, Debug)]
#[command(name = "traveller")]
#[command(about = "Tourist arrival statistics: trends, charts and stats store")]
struct Cli {
    /// Stats store file (defaults to TRAVELLER_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze monthly arrival trends for one or more years
    Trend {
        /// Years to analyze
        #[arg(short, long, required = true)]
        year: Vec<i32>,

        /// CSV file per year, in the same order as --year
        /// (defaults to <data dir>/all_country_arrivals_<year>.csv)
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Render a chart to this path (.png or .svg)
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Open the rendered chart
        #[arg(long, requires = "chart")]
        show: bool,

        /// Print the aggregated trend as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Countries listed per year in the summary
        #[arg(long, default_value = "10")]
        top: usize,

        /// Chart title
        #[arg(long)]
        title: Option<String>,
    },

    /// Insert a year's arrival table into the store
    Import {
        year: i32,
        file_path: PathBuf,
    },

    /// Delete stored stats and the time frames they leave empty
    Delete {
        /// Only delete this year
        #[arg(long)]
        year: Option<i32>,

        /// Skip the confirmation prompt
        #[arg(long)]
        confirm: bool,
    },

    /// List stored arrivals, one page at a time
    List {
        #[arg(long)]
        page: Option<String>,

        #[arg(long)]
        per_page: Option<usize>,
    },

    /// Chart data for one country as JSON
    Country { name: String },

    /// Every stored arrival as JSON
    All,

    /// Check that the store file can be read
    CheckDb,

    /// Print model version history
    History { model: Option<String> },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("traveller=info".parse()?))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path.clone());

    match cli.command {
        Command::Trend {
            year,
            file,
            chart,
            show,
            json,
            top,
            title,
        } => {
            let jobs = year_files(&config, &year, &file)?;
            run_trend(&config, &jobs, chart, show, json, top, title)
        }
        Command::Import { year, file_path } => {
            let trend = analyze_file(&YearFile::new(year, &file_path))
                .with_context(|| format!("Could not analyze {}", file_path.display()))?;
            let mut store = ArrivalStore::open(&store_path)?;
            let report = store::import_aggregate(&mut store, &trend)?;
            store.save()?;
            println!(
                "Successfully imported data for {} countries in year {} ({} records, {} duplicates skipped)",
                report.countries, year, report.inserted, report.skipped_duplicates
            );
            Ok(())
        }
        Command::Delete { year, confirm } => run_delete(&store_path, year, confirm),
        Command::List { page, per_page } => {
            let store = ArrivalStore::open(&store_path)?;
            let page = store::arrivals_paginated(
                &store,
                per_page.unwrap_or(config.page_size),
                page.as_deref(),
            );
            for row in &page.items {
                println!("{:>6}  {row}  {}", row.id, row.passengers);
            }
            println!(
                "Page {} of {} ({} records)",
                page.number, page.num_pages, page.total
            );
            Ok(())
        }
        Command::Country { name } => {
            let store = ArrivalStore::open(&store_path)?;
            let chart = store::country_arrivals(&store, &name);
            println!("{}", serde_json::to_string_pretty(&chart)?);
            Ok(())
        }
        Command::All => {
            let store = ArrivalStore::open(&store_path)?;
            println!("{}", serde_json::to_string_pretty(&store::all_arrivals(&store))?);
            Ok(())
        }
        Command::CheckDb => {
            println!("Testing store connection...");
            match ArrivalStore::open(&store_path).and_then(|s| s.check()) {
                Ok(status) => {
                    println!(
                        "Store connection successful! {} stats, {} time frames",
                        status.stats, status.timeframes
                    );
                    println!("Connected to: {}", store_path.display());
                    if !status.exists {
                        println!("Store file does not exist yet; it is created on first import.");
                    }
                }
                Err(e) => println!("Store connection failed! Error: {e}"),
            }
            Ok(())
        }
        Command::History { model } => {
            let registry = ModelRegistry::builtin();
            let models: Vec<String> = match model {
                Some(m) => vec![m],
                None => registry.model_names().iter().map(|m| m.to_string()).collect(),
            };
            for model in models {
                let history = registry
                    .render_history(&model)
                    .with_context(|| format!("Unknown model: {model}"))?;
                println!("== {model}{history}");
            }
            Ok(())
        }
    }
}

/// Pair years with files; missing files fall back to the data directory.
fn year_files(config: &Config, years: &[i32], files: &[PathBuf]) -> Result<Vec<YearFile>> {
    if !files.is_empty() && files.len() != years.len() {
        bail!(
            "Got {} --file values for {} --year values; pass one file per year",
            files.len(),
            years.len()
        );
    }

    Ok(years
        .iter()
        .enumerate()
        .map(|(i, &year)| {
            let path = files
                .get(i)
                .cloned()
                .unwrap_or_else(|| config.arrivals_file(year));
            YearFile::new(year, path)
        })
        .collect())
}

fn run_trend(
    config: &Config,
    jobs: &[YearFile],
    chart: Option<PathBuf>,
    show: bool,
    json: bool,
    top: usize,
    title: Option<String>,
) -> Result<()> {
    let outcomes = analyze_files(jobs);
    let trend = merge_outcomes(&outcomes);
    if trend.is_empty() {
        bail!("No arrival data could be analyzed");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
    } else {
        let summaries = StatsCalculator::summarize(&trend);
        let mut current_year = None;
        for s in StatsCalculator::top_countries(&summaries, top) {
            if current_year != Some(s.year) {
                println!("\n== {} ==", s.year);
                println!(
                    "{:<32} {:>12} {:>10} {:>10}  {:<10} {:<10}",
                    "Country", "Total", "Mean", "Std", "Peak", "Low"
                );
                current_year = Some(s.year);
            }
            println!(
                "{:<32} {:>12.0} {:>10.0} {:>10.0}  {:<10} {:<10}",
                s.country, s.total, s.monthly_mean, s.monthly_std, s.peak_month, s.low_month
            );
        }
    }

    if let Some(path) = chart {
        let mut options = PlotOptions {
            width: config.chart_width,
            height: config.chart_height,
            ..PlotOptions::default()
        };
        if let Some(title) = title {
            options.title = title;
        }
        TrendPlotter::plot_trend(&trend, &options, &path)?;
        println!("Chart written to {}", path.display());
        if show {
            TrendPlotter::show(&path)?;
        }
    }

    Ok(())
}

fn run_delete(store_path: &Path, year: Option<i32>, confirm: bool) -> Result<()> {
    let mut store = ArrivalStore::open(store_path)?;
    let count = store.count(year);
    let message = match year {
        Some(y) => format!("This will delete all data for year {y} ({count} records)"),
        None => format!("This will delete ALL stored arrival data ({count} records)"),
    };

    if !confirm {
        println!("{message}");
        print!("Are you sure you want to proceed? (yes/no): ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("yes") {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let report = store.delete_stats(year);
    store.save()?;
    info!(timeframes = report.timeframes, "Removed empty time frames");
    println!("Successfully deleted {} records!", report.stats);
    Ok(())
}
