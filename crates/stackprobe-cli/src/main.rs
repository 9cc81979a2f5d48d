//! stackprobe: enrich a table of URLs with the technologies behind them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use stackprobe_client::FingerprintClient;
use stackprobe_core::AppConfig;
use stackprobe_enricher::{Enricher, WorkflowOptions};

#[derive(Debug, Parser)]
#[command(
    name = "stackprobe",
    about = "Look up the technology stack of every URL in a table",
    version
)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input table holding the URLs.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Report path; `.csv`, `.json` or `.xlsx`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Column holding the URLs.
    #[arg(long)]
    url_column: Option<String>,

    /// Sheet holding the URLs (spreadsheet inputs only).
    #[arg(long)]
    sheet: Option<String>,

    /// Seconds to pause after every request.
    #[arg(long)]
    delay_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Flags win over the config file and environment.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input.path.clone_from(input);
        }
        if let Some(output) = &self.output {
            config.output.path.clone_from(output);
        }
        if let Some(column) = &self.url_column {
            config.input.url_column.clone_from(column);
        }
        if let Some(sheet) = &self.sheet {
            config.input.sheet_name.clone_from(sheet);
        }
        if let Some(secs) = self.delay_secs {
            config.api.rate_limit_delay_secs = secs;
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config =
        AppConfig::load_with_env(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config);

    if cli.print_config {
        print!("{}", config.to_masked_toml()?);
        return Ok(());
    }

    config.validate().context("invalid configuration")?;

    info!("Starting stackprobe v{}", env!("CARGO_PKG_VERSION"));

    let client = FingerprintClient::from_config(&config.api)?;
    let enricher = Enricher::new(Arc::new(client));
    let options = WorkflowOptions::from_config(&config.input);

    let summary = enricher
        .run_workflow(&config.input.path, &config.output.path, &options)
        .await?;

    info!(
        total = summary.total,
        emitted = summary.emitted,
        dropped = summary.dropped,
        elapsed_secs = (summary.finished_at - summary.started_at).num_seconds(),
        "Wrote {}",
        config.output.path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "stackprobe",
            "--input",
            "sites.csv",
            "--output",
            "out.json",
            "--url-column",
            "website",
            "--delay-secs",
            "0",
        ])
        .expect("parse args");

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.input.path, PathBuf::from("sites.csv"));
        assert_eq!(config.output.path, PathBuf::from("out.json"));
        assert_eq!(config.input.url_column, "website");
        assert_eq!(config.input.sheet_name, "WHATCMS INPUT");
        assert_eq!(config.api.rate_limit_delay_secs, 0);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["stackprobe"]).expect("parse args");
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.input.url_column, "url");
        assert_eq!(config.api.rate_limit_delay_secs, 10);
        assert_eq!(cli.log_level, "info");
        assert!(!cli.print_config);
    }
}
