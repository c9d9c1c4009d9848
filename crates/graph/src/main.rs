//! CiteForge citation graph builder
//!
//! Builds a citation graph around a personal bibliography:
//! - Resolves owned papers and their references/citations via the metadata service
//! - Counts how often each related paper is seen
//! - Prunes low-signal papers and recommends the most frequent ones
//! - Exports a CSV of recommendations and an interactive graph page

mod bibliography;
mod citation;
mod errors;
mod export;
mod extract;
mod pipeline;
mod prompt;
mod report;

use citation::Classifier;
use citeforge_common::config::{AppConfig, RateLimitMode};
use citeforge_common::errors::AppError;
use citeforge_common::metrics::{self, FETCH_BUCKETS, METRICS_PREFIX};
use citeforge_common::scholar::{Fetcher, RetryPolicy, SemanticScholarClient};
use citeforge_common::{Membership, VERSION};
use clap::{Parser, ValueEnum};
use errors::Result;
use export::{GraphView, WriteOutcome};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "citeforge")]
#[command(version)]
#[command(about = "Build a citation graph around your bibliography and recommend papers", long_about = None)]
struct Cli {
    /// Bibliography file (.bib or .txt with one DOI per line)
    bibliography: PathBuf,

    /// Configuration file, replaces the config/ directory lookup
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the recommended papers CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Where to write the graph page
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Leave existing output files untouched
    #[arg(long)]
    no_overwrite: bool,

    /// What to do when the service rate limits us
    #[arg(long, value_enum)]
    on_rate_limit: Option<RateLimitArg>,

    /// Quantile at or below which new papers are pruned
    #[arg(long)]
    prune_quantile: Option<f64>,

    /// Quantile at or above which new papers are recommended
    #[arg(long)]
    promote_quantile: Option<f64>,

    /// Write a Prometheus metrics snapshot here after the run
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RateLimitArg {
    Ask,
    Wait,
    Abort,
}

impl From<RateLimitArg> for RateLimitMode {
    fn from(arg: RateLimitArg) -> Self {
        match arg {
            RateLimitArg::Ask => RateLimitMode::Ask,
            RateLimitArg::Wait => RateLimitMode::Wait,
            RateLimitArg::Abort => RateLimitMode::Abort,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.csv {
            config.output.csv_path = path.clone();
        }
        if let Some(path) = &self.graph {
            config.output.graph_path = path.clone();
        }
        if self.no_overwrite {
            config.output.overwrite = false;
        }
        if let Some(mode) = self.on_rate_limit {
            config.scholar.on_rate_limit = mode.into();
        }
        if let Some(q) = self.prune_quantile {
            config.classification.prune_quantile = q;
        }
        if let Some(q) = self.promote_quantile {
            config.classification.promote_quantile = q;
        }
        if let Some(path) = &self.metrics {
            config.observability.metrics_path = Some(path.clone());
        }
        match self.verbose {
            0 => {}
            1 => config.observability.log_level = "debug".to_string(),
            _ => config.observability.log_level = "trace".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&config);
    info!("Starting CiteForge v{}", VERSION);

    let recorder = match &config.observability.metrics_path {
        Some(_) => Some(install_recorder()?),
        None => None,
    };
    metrics::register_metrics();

    if let Err(e) = run(&cli.bibliography, &config).await {
        error!(code = e.code().as_code(), error = %e, "Run failed");
        return Err(e.into());
    }

    if let (Some(handle), Some(path)) = (recorder, &config.observability.metrics_path) {
        std::fs::write(path, handle.render())?;
        info!(path = %path.display(), "Metrics snapshot written");
    }

    Ok(())
}

fn load_config(cli: &Cli) -> std::result::Result<AppConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };
    cli.apply(&mut config);
    config.validated()
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_fetch_duration_seconds", METRICS_PREFIX)),
            FETCH_BUCKETS,
        )?
        .install_recorder()?;
    Ok(handle)
}

async fn run(bibliography: &Path, config: &AppConfig) -> Result<()> {
    let entries = bibliography::read_bibliography(bibliography)?;
    info!(path = %bibliography.display(), entries = entries.len(), "Bibliography loaded");

    let client = SemanticScholarClient::new(&config.scholar)?;
    let fetcher = Fetcher::new(client, RetryPolicy::from(&config.scholar));
    let decider = prompt::decider_for(config.scholar.on_rate_limit);

    let pipeline::BuildOutcome { mut corpus, stats } = pipeline::build_corpus(
        &entries,
        &fetcher,
        decider.as_ref(),
        config.classification.owned_resighting,
    )
    .await;

    let classification = Classifier::new(config.classification.clone()).run(&mut corpus);
    info!(
        owned = corpus.count_membership(Membership::Owned),
        new = corpus.count_membership(Membership::New),
        recommended = classification.promote.promoted,
        "Classification complete"
    );

    let report = report::build_report(&corpus, &stats);
    println!("{}", report);

    let csv = export::write_recommended_csv(&config.output.csv_path, &report.recommended, config.output.overwrite)?;
    let view = GraphView::from_corpus(&corpus, config.output.max_node_size);
    let graph = export::write_graph_page(&config.output.graph_path, &view, config.output.overwrite)?;

    for (outcome, path) in [(csv, &config.output.csv_path), (graph, &config.output.graph_path)] {
        match outcome {
            WriteOutcome::Written => println!("Wrote {}", path.display()),
            WriteOutcome::Skipped => warn!(path = %path.display(), "Output not written, file exists"),
        }
    }

    if stats.aborted {
        warn!("Run was stopped early, results are partial");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "citeforge",
            "refs.bib",
            "--csv",
            "out/rec.csv",
            "--no-overwrite",
            "--on-rate-limit",
            "abort",
            "--prune-quantile",
            "0.9",
            "-vv",
        ]);
        let mut config = AppConfig::default();

        cli.apply(&mut config);

        assert_eq!(cli.bibliography, PathBuf::from("refs.bib"));
        assert_eq!(config.output.csv_path, PathBuf::from("out/rec.csv"));
        assert!(!config.output.overwrite);
        assert_eq!(config.scholar.on_rate_limit, RateLimitMode::Abort);
        assert_eq!(config.classification.prune_quantile, 0.9);
        assert_eq!(config.classification.promote_quantile, 0.98);
        assert_eq!(config.observability.log_level, "trace");
    }

    #[test]
    fn test_cli_defaults_leave_config() {
        let cli = Cli::parse_from(["citeforge", "refs.txt"]);
        let mut config = AppConfig::default();

        cli.apply(&mut config);

        assert!(config.output.overwrite);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.metrics_path, None);
    }

    #[test]
    fn test_nan_override_rejected() {
        let cli = Cli::parse_from(["citeforge", "refs.bib", "--prune-quantile", "NaN"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert!(config.classification.prune_quantile.is_nan());
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = Cli::parse_from(["citeforge", "refs.bib", "--promote-quantile", "2.0"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert!(config.validated().is_err());
    }
}
