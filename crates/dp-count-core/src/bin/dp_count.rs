//! Differentially Private Count CLI
//!
//! Answers counting queries over a ratings CSV within one privacy budget.
//!
//! Usage:
//!   dp-count --db <csv> --budget <ε> count --movie <name> --min-stars <n> --epsilon <ε>
//!   dp-count --db <csv> --budget <ε> batch <queries.json>
//!   dp-count --db <csv> --config <config.json> batch <queries.json>

use clap::{Parser, Subcommand};
use dp_count_core::laplace::confidence_interval_95;
use dp_count_core::{
    BudgetSnapshot, DpQuerier, QuerierConfig, RatingPredicate, RatingsDataset, ReleasePolicy,
    COUNT_SENSITIVITY,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dp-count")]
#[command(version)]
#[command(about = "Differentially private counts over a ratings dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Ratings CSV (user,movie,date,stars)
    #[arg(long)]
    db: PathBuf,

    /// Total privacy budget ε for this session
    #[arg(long, required_unless_present = "config")]
    budget: Option<f64>,

    /// JSON session config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clamp negative noisy counts to zero
    #[arg(long)]
    clamp: bool,

    /// Re-release the stored answer for a repeated query
    #[arg(long)]
    reuse_answers: bool,

    /// Output format: json, compact, or table
    #[arg(short, long, default_value = "json")]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single count query
    Count {
        /// Movie name
        #[arg(short, long)]
        movie: String,

        /// Minimum stars (1-5)
        #[arg(short = 's', long)]
        min_stars: u8,

        /// Privacy cost of this query
        #[arg(short, long)]
        epsilon: f64,
    },

    /// Run queries from a JSON array of {movie, min_stars, epsilon}
    Batch {
        /// Query file
        queries: PathBuf,
    },
}

#[derive(serde::Deserialize)]
struct QuerySpec {
    movie: String,
    min_stars: u8,
    epsilon: f64,
}

#[derive(serde::Serialize)]
struct QueryOutcome {
    movie: String,
    min_stars: u8,
    epsilon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    noisy_count: Option<f64>,
    /// Half-width of the 95% noise interval
    #[serde(skip_serializing_if = "Option::is_none")]
    ci95: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(serde::Serialize)]
struct Report {
    results: Vec<QueryOutcome>,
    budget: BudgetSnapshot,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = session_config(&cli)?;

    let dataset = Arc::new(RatingsDataset::from_path(&cli.db)?);
    tracing::info!(rows = dataset.len(), path = %cli.db.display(), "loaded ratings");
    let querier = DpQuerier::new(dataset, config)?;

    let specs = match cli.command {
        Commands::Count {
            movie,
            min_stars,
            epsilon,
        } => vec![QuerySpec {
            movie,
            min_stars,
            epsilon,
        }],
        Commands::Batch { queries } => serde_json::from_str(&fs::read_to_string(queries)?)?,
    };

    let results: Vec<QueryOutcome> = specs
        .into_iter()
        .map(|spec| {
            let predicate = RatingPredicate::new(spec.movie.clone(), spec.min_stars);
            let (noisy_count, error) = match querier.get_count(&predicate, spec.epsilon) {
                Ok(value) => (Some(value), None),
                Err(e) => (None, Some(e.to_string())),
            };
            QueryOutcome {
                ci95: noisy_count
                    .and_then(|_| confidence_interval_95(COUNT_SENSITIVITY, spec.epsilon).ok()),
                movie: spec.movie,
                min_stars: spec.min_stars,
                epsilon: spec.epsilon,
                noisy_count,
                error,
            }
        })
        .collect();

    let failed = results.iter().any(|r| r.error.is_some());
    let report = Report {
        results,
        budget: querier.budget_snapshot(),
    };

    let output = match cli.format.as_str() {
        "compact" => serde_json::to_string(&report)?,
        "table" => report_to_table(&report),
        _ => serde_json::to_string_pretty(&report)?,
    };
    println!("{}", output);

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn session_config(cli: &Cli) -> Result<QuerierConfig, Box<dyn std::error::Error>> {
    let mut config = match (&cli.config, cli.budget) {
        (Some(path), _) => QuerierConfig::from_path(path)?,
        (None, Some(total)) => QuerierConfig::new(total),
        (None, None) => return Err("either --budget or --config is required".into()),
    };

    if let Some(total) = cli.budget {
        config.privacy_budget_total = total;
    }
    if cli.clamp {
        config.release = ReleasePolicy::ClampNonNegative;
    }
    if cli.reuse_answers {
        config.reuse_answers = true;
    }
    Ok(config)
}

fn report_to_table(report: &Report) -> String {
    let mut out = format!(
        "{:<32} {:>5} {:>8} {:>12} {:>8}  {}\n",
        "movie", "stars", "epsilon", "noisy_count", "±95%", "error"
    );
    out.push_str(&"-".repeat(80));
    out.push('\n');

    for r in &report.results {
        let count = r.noisy_count.map(|c| format!("{:.2}", c)).unwrap_or_default();
        let ci = r.ci95.map(|c| format!("{:.2}", c)).unwrap_or_default();
        out.push_str(&format!(
            "{:<32} {:>5} {:>8.4} {:>12} {:>8}  {}\n",
            r.movie,
            r.min_stars,
            r.epsilon,
            count,
            ci,
            r.error.as_deref().unwrap_or("")
        ));
    }

    out.push_str(&format!(
        "\nbudget: total ε={:.4}, consumed ε={:.4}, remaining ε={:.4}, queries={}",
        report.budget.total,
        report.budget.consumed,
        report.budget.remaining,
        report.budget.query_count
    ));
    out
}
