//! Sequential scenario runner.
//!
//! Each scenario runs inside its own EVM snapshot and under a wall-clock
//! timeout. A failing scenario is recorded and the run moves on.

use crate::error::ScenarioError;
use crate::scenario::Verifier;
use harness_types::{PoolDescriptor, PoolRegistry, RunSummary, ScenarioOutcome};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{error, info, info_span, warn, Instrument};

#[derive(Debug, Clone)]
pub struct RunnerOptions {
	pub scenario_timeout: Duration,
	/// Upper bound on the whole run. `None` is unbounded.
	pub run_timeout: Option<Duration>,
	/// Revert chain state after every scenario.
	pub isolate: bool,
}

impl RunnerOptions {
	/// Builds options from millisecond settings, where a run timeout of `0`
	/// means no limit.
	pub fn from_millis(scenario_timeout_ms: u64, run_timeout_ms: u64) -> Self {
		Self {
			scenario_timeout: Duration::from_millis(scenario_timeout_ms),
			run_timeout: (run_timeout_ms > 0).then(|| Duration::from_millis(run_timeout_ms)),
			isolate: true,
		}
	}
}

impl Default for RunnerOptions {
	fn default() -> Self {
		Self::from_millis(100_000, 0)
	}
}

pub async fn run_all(verifier: &Verifier, pools: &PoolRegistry, options: &RunnerOptions) -> RunSummary {
	let started = Instant::now();
	let mut summary = RunSummary::default();

	info!(scenarios = pools.len(), "Starting run");

	for (name, pool) in pools.iter() {
		let budget = match options.run_timeout {
			Some(limit) => {
				let elapsed = started.elapsed();
				if elapsed >= limit {
					warn!(pool = %name, "Run timeout reached, not starting scenario");
					summary
						.failed
						.push((name.clone(), format!("run timed out after {:?}", limit)));
					continue;
				}
				options.scenario_timeout.min(limit - elapsed)
			}
			None => options.scenario_timeout,
		};

		let span = info_span!("scenario", pool = %name, address = %pool.pool);
		match run_isolated(verifier, name, pool, budget, options.isolate)
			.instrument(span)
			.await
		{
			Ok(ScenarioOutcome::Passed(_)) => {
				info!(pool = %name, "Passed");
				summary.passed.push(name.clone());
			}
			Ok(ScenarioOutcome::Skipped(reason)) => {
				info!(pool = %name, %reason, "Skipped");
				summary.skipped.push((name.clone(), reason));
			}
			Err(e) => {
				error!(pool = %name, error = %e, "Failed");
				summary.failed.push((name.clone(), e.to_string()));
			}
		}
	}

	info!(%summary, elapsed = ?started.elapsed(), "Run finished");
	summary
}

async fn run_isolated(
	verifier: &Verifier,
	name: &str,
	pool: &PoolDescriptor,
	budget: Duration,
	isolate: bool,
) -> Result<ScenarioOutcome, ScenarioError> {
	let chain = verifier.factory().chain();
	let snapshot = if isolate {
		Some(chain.snapshot().await?)
	} else {
		None
	};

	let result = timeout(budget, verifier.run_scenario(name, pool))
		.await
		.unwrap_or(Err(ScenarioError::Timeout(budget)));

	if let Some(id) = snapshot {
		match chain.revert_to(id).await {
			Ok(true) => {}
			Ok(false) => warn!(%id, "Node refused to revert snapshot"),
			Err(e) => warn!(%id, error = %e, "Failed to revert snapshot"),
		}
	}

	result
}
