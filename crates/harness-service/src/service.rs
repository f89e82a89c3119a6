//! Wires configuration, the forked node and the verifier into one run.

use anyhow::{bail, Context, Result};
use harness_chain::{contract_factory, deploy_contracts, ForkedNode};
use harness_config::{all_networks, AccountsConfig, HarnessConfig, RunnerConfig};
use harness_core::{run_all, FundingPlan, RunnerOptions, Verifier};
use harness_types::{PoolRegistry, RunSummary, WhaleRegistry, U256};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct HarnessService {
	config: HarnessConfig,
}

impl HarnessService {
	pub fn new(config: HarnessConfig) -> Self {
		Self { config }
	}

	/// Loads the pool and whale registries, optionally narrowed to one pool.
	pub fn load_data(&self, only: Option<&str>) -> Result<(PoolRegistry, WhaleRegistry)> {
		let runner = &self.config.runner;

		let mut pools = PoolRegistry::from_file(&runner.pools_file)
			.with_context(|| format!("Failed to load pools from {:?}", runner.pools_file))?;
		pools.retain_named(only);
		if pools.is_empty() {
			match only {
				Some(name) => bail!("No pool named {:?} in {:?}", name, runner.pools_file),
				None => bail!("Pool registry {:?} is empty", runner.pools_file),
			}
		}

		let whales = WhaleRegistry::from_file(&runner.whales_file)
			.with_context(|| format!("Failed to load whales from {:?}", runner.whales_file))?;

		info!(pools = pools.len(), whales = whales.len(), "Static data loaded");
		Ok((pools, whales))
	}

	/// Spawns the fork, deploys the contracts and runs every scenario.
	///
	/// The node is torn down when this returns.
	#[instrument(skip(self), fields(network = %self.config.harness.network))]
	pub async fn run(&self, only: Option<&str>) -> Result<RunSummary> {
		let (pools, whales) = self.load_data(only)?;

		let network = self.config.local_network();
		let node = ForkedNode::spawn(&network, self.config.runner.anvil_path.as_deref())
			.context("Failed to spawn forked node")?;
		info!(
			endpoint = %node.endpoint(),
			chain_id = network.chain_id,
			block = node.block_number().await?,
			"Forked node ready"
		);

		let deployment = deploy_contracts(&node, &self.config)
			.await
			.context("Failed to deploy contracts")?;
		let factory = contract_factory(
			&node,
			deployment,
			self.config.adapter.curve_factory,
			self.config.adapter.gas_limit,
		);

		let verifier = Verifier::new(Arc::new(factory), whales, funding_plan(&self.config.runner)?);
		Ok(run_all(&verifier, &pools, &runner_options(&self.config.runner)).await)
	}
}

pub fn funding_plan(runner: &RunnerConfig) -> Result<FundingPlan> {
	let whale_gas_allowance: U256 = runner
		.whale_gas_allowance
		.parse()
		.with_context(|| format!("Invalid whale gas allowance {:?}", runner.whale_gas_allowance))?;

	Ok(FundingPlan {
		storage_units: runner.funding_amount,
		whale_gas_allowance,
	})
}

pub fn runner_options(runner: &RunnerConfig) -> RunnerOptions {
	RunnerOptions::from_millis(runner.scenario_timeout_ms, runner.timeout_ms)
}

/// One line per named network: profile, chain id, default gas price, RPC URL.
pub fn network_table(accounts: &AccountsConfig) -> Vec<String> {
	all_networks(accounts)
		.into_iter()
		.map(|network| {
			let gas = network.name.descriptor().default_gas_price / 1_000_000_000;
			format!(
				"{:<18} {:>8} {:>5} gwei  {}",
				network.name,
				network.chain_id,
				gas,
				network.url.unwrap_or_default()
			)
		})
		.collect()
}
