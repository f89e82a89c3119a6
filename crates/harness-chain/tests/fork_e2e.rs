//! End-to-end tests against a mainnet fork.
//!
//! Run with: `cargo test -p harness-chain --test fork_e2e -- --ignored`
//! Requires the `ETH_RPC_URL` environment variable. The full scenario test
//! also needs compiled artifacts under `HARNESS_ARTIFACTS` (default
//! `./artifacts`).

use alloy::primitives::{address, Address, U256};
use harness_chain::{contract_factory, deploy_contracts, Deployment, ForkedNode};
use harness_config::{ForkSettings, HarnessConfig};
use harness_core::{FundingPlan, Verifier};
use harness_types::{ContractFactory, NetworkId, PoolDescriptor, ScenarioOutcome, WhaleRegistry};
use std::path::PathBuf;
use std::sync::Arc;

const CRV: Address = address!("D533a949740bb3306d119CC777fa900bA034cd52");
const CRV_WHALE: Address = address!("5f3b5DfEb7B28CDbD7FAba78963EE202a494e2A2");
const CRVETH_POOL: Address = address!("8301AE4fc9c624d1D396cbDAa1ed877821D7C511");
const CRVETH_LP: Address = address!("Ed4064f376cB8d68F770FB1Ff088a3d0F3FF5c4d");

fn fork_config() -> Option<HarnessConfig> {
	let url = match std::env::var("ETH_RPC_URL") {
		Ok(url) => url,
		Err(_) => {
			eprintln!("Skipping test: ETH_RPC_URL not set");
			return None;
		}
	};

	let mut config = HarnessConfig::default();
	config.harness.network = NetworkId::Main;
	config.fork = ForkSettings {
		network: Some(NetworkId::Main),
		block_number: None,
		url: Some(url),
	};
	Some(config)
}

fn spawn(config: &HarnessConfig) -> anyhow::Result<ForkedNode> {
	Ok(ForkedNode::spawn(&config.local_network(), None)?)
}

#[tokio::test]
#[ignore = "Requires ETH_RPC_URL environment variable"]
async fn test_storage_write_is_reverted_by_snapshot() -> anyhow::Result<()> {
	let Some(config) = fork_config() else {
		return Ok(());
	};
	let node = spawn(&config)?;
	let alice = node.roles().alice.expect("alice is derived by default");

	// no contracts are needed for token and chain clients
	let deployment = Deployment {
		harness: alice,
		adapter: Address::ZERO,
	};
	let factory = contract_factory(&node, deployment, config.adapter.curve_factory, None);
	let crv = factory.token(CRV);
	let chain = factory.chain();

	let before = crv.balance_of(alice).await?;
	let snapshot = chain.snapshot().await?;

	let amount = U256::from(1_234u64) * U256::from(10u64).pow(U256::from(18u64));
	let slot = chain.set_token_balance(CRV, alice, amount).await?;
	assert_eq!(crv.balance_of(alice).await?, amount);

	// cached slot is reused
	assert_eq!(chain.set_token_balance(CRV, alice, amount).await?, slot);

	assert!(chain.revert_to(snapshot).await?);
	assert_eq!(crv.balance_of(alice).await?, before);
	Ok(())
}

#[tokio::test]
#[ignore = "Requires ETH_RPC_URL environment variable"]
async fn test_impersonated_whale_transfer() -> anyhow::Result<()> {
	let Some(config) = fork_config() else {
		return Ok(());
	};
	let node = spawn(&config)?;
	let alice = node.roles().alice.expect("alice is derived by default");

	let deployment = Deployment {
		harness: alice,
		adapter: Address::ZERO,
	};
	let factory = contract_factory(&node, deployment, config.adapter.curve_factory, None);
	let crv = factory.token(CRV);
	let chain = factory.chain();

	let before = crv.balance_of(alice).await?;
	let amount = U256::from(10u64).pow(U256::from(12u64));

	chain.impersonate(CRV_WHALE).await?;
	chain
		.send_native(CRV_WHALE, U256::from(10u64).pow(U256::from(20u64)))
		.await?;
	crv.transfer_as(CRV_WHALE, alice, amount).await?;
	chain.stop_impersonating(CRV_WHALE).await?;

	assert_eq!(crv.balance_of(alice).await?, before + amount);
	Ok(())
}

#[tokio::test]
#[ignore = "Requires ETH_RPC_URL and compiled artifacts"]
async fn test_crveth_scenario() -> anyhow::Result<()> {
	let Some(mut config) = fork_config() else {
		return Ok(());
	};
	config.paths.artifacts = std::env::var("HARNESS_ARTIFACTS")
		.map(PathBuf::from)
		.unwrap_or_else(|_| PathBuf::from("./artifacts"));
	if !config.paths.artifacts.exists() {
		eprintln!("Skipping test: no artifacts at {:?}", config.paths.artifacts);
		return Ok(());
	}

	let node = spawn(&config)?;
	let deployment = deploy_contracts(&node, &config).await?;
	let factory = contract_factory(&node, deployment, config.adapter.curve_factory, None);

	let mut whales = WhaleRegistry::default();
	whales.insert(CRV, CRV_WHALE);
	let verifier = Verifier::new(Arc::new(factory), whales, FundingPlan::default());

	let pool = PoolDescriptor {
		pool: CRVETH_POOL,
		lp_token: CRVETH_LP,
		tokens: vec![CRV],
	};
	let outcome = verifier.run_scenario("crveth", &pool).await?;

	match outcome {
		ScenarioOutcome::Passed(report) => assert!(report.lp_after_withdraw.is_zero()),
		ScenarioOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
	}
	Ok(())
}
