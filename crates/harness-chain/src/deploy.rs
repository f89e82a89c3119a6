//! Deploys the harness and adapter contracts for one run.

use crate::artifacts::{deploy, load_artifact};
use crate::clients::{AlloyContractFactory, Deployment};
use crate::node::ForkedNode;
use crate::ChainError;
use alloy::primitives::Address;
use alloy::sol_types::SolValue;
use harness_config::{AdapterConfig, HarnessConfig};
use tracing::info;

/// Constructor arguments of the adapter under test.
pub fn adapter_constructor_args(adapter: &AdapterConfig) -> Vec<u8> {
	(
		adapter.registry,
		adapter.curve_factory,
		adapter.curve_meta_registry,
	)
		.abi_encode_params()
}

/// Deploys the adapter and the harness contract from the deployer account.
pub async fn deploy_contracts(
	node: &ForkedNode,
	config: &HarnessConfig,
) -> Result<Deployment, ChainError> {
	let artifacts = &config.paths.artifacts;
	let deployer = node.roles().deployer;

	let adapter_artifact = load_artifact(artifacts, &config.adapter.artifact)?;
	let adapter = deploy(
		node.provider(),
		deployer,
		&adapter_artifact,
		&adapter_constructor_args(&config.adapter),
	)
	.await?;

	let harness_artifact = load_artifact(artifacts, &config.adapter.harness_artifact)?;
	let harness = deploy(node.provider(), deployer, &harness_artifact, &[]).await?;

	info!(%adapter, %harness, "Contracts deployed");
	Ok(Deployment { harness, adapter })
}

/// Builds the client factory for a deployment on `node`.
pub fn contract_factory(
	node: &ForkedNode,
	deployment: Deployment,
	curve_factory: Address,
	gas_limit: Option<u64>,
) -> AlloyContractFactory {
	let roles = node.roles();
	AlloyContractFactory::new(
		node.provider().clone(),
		node.unsigned_provider().clone(),
		deployment,
		curve_factory,
		roles.admin,
		roles.deployer,
	)
	.with_gas_limit(gas_limit)
}
