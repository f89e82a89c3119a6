use anyhow::{bail, Context, Result};
use clap::Parser;
use harness_config::{AccountsConfig, ConfigLoader, HarnessConfig};
use harness_service::cli::{Args, Command};
use harness_service::service::{network_table, HarnessService};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	match args.command.clone().unwrap_or_default() {
		Command::Run { only, report } => run(&args, only.as_deref(), report).await,
		Command::Validate => validate_config(&args).await,
		Command::Networks => {
			setup_tracing(args.log_level.as_deref().unwrap_or("info"))?;
			for line in network_table(&AccountsConfig::default()) {
				println!("{}", line);
			}
			Ok(())
		}
	}
}

async fn load_config(args: &Args) -> Result<HarnessConfig> {
	let config = ConfigLoader::new()
		.with_file(&args.config)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", args.config))?;

	setup_tracing(args.log_level.as_deref().unwrap_or(&config.harness.log_level))?;
	Ok(config)
}

async fn run(args: &Args, only: Option<&str>, report: Option<PathBuf>) -> Result<()> {
	let config = load_config(args).await?;
	info!("Starting Curve adapter harness");
	info!("Configuration loaded from: {:?}", args.config);

	let summary = HarnessService::new(config).run(only).await?;

	for (name, reason) in &summary.skipped {
		warn!(pool = %name, %reason, "Skipped");
	}
	for (name, failure) in &summary.failed {
		error!(pool = %name, "{}", failure);
	}
	info!("{}", summary);

	if let Some(path) = report {
		write_report(&path, &summary)?;
	}

	if !summary.is_success() {
		bail!("{} of {} scenarios failed", summary.failed.len(), summary.total());
	}
	Ok(())
}

fn write_report(path: &Path, summary: &harness_types::RunSummary) -> Result<()> {
	let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
	std::fs::write(path, json).with_context(|| format!("Failed to write report to {:?}", path))?;
	info!("Report written to {:?}", path);
	Ok(())
}

async fn validate_config(args: &Args) -> Result<()> {
	let config = load_config(args).await?;
	let local = config.local_network();

	info!("Configuration is valid");
	info!("Network profile: {}", config.harness.network);
	info!("Chain ID: {}", local.chain_id);
	match &local.forking {
		Some(fork) => info!(
			"Forking: {} at {}",
			fork.url,
			fork.block_number
				.map(|b| b.to_string())
				.unwrap_or_else(|| "latest".to_string())
		),
		None => info!("Forking: disabled"),
	}
	info!("Pools: {:?}", config.runner.pools_file);

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}
