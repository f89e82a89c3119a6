//! Simulated node session.
//!
//! Spawns anvil from a [`NetworkUserConfig`], optionally forking a live
//! network, and builds the providers the harness talks through.

use crate::accounts::{derive_signers, Roles};
use crate::ChainError;
use alloy::network::EthereumWallet;
use alloy::node_bindings::{Anvil, AnvilInstance};
use alloy::primitives::{utils::format_units, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use harness_config::NetworkUserConfig;
use std::path::Path;
use tracing::info;

/// Milliseconds anvil gets to come up; forking a remote node is slow.
const SPAWN_TIMEOUT_MS: u64 = 45_000;

pub struct ForkedNode {
	/// Kept alive for the lifetime of the session, killed on drop.
	anvil: AnvilInstance,
	/// Signs for every derived account.
	provider: DynProvider,
	/// No local signers; used for impersonated senders.
	unsigned: DynProvider,
	roles: Roles,
}

impl ForkedNode {
	/// Starts anvil according to `network` and connects to it.
	pub fn spawn(network: &NetworkUserConfig, anvil_path: Option<&Path>) -> Result<Self, ChainError> {
		let accounts = &network.accounts;
		let signers = derive_signers(accounts)?;
		let roles = Roles::from_signers(&signers)?;

		let balance = accounts.balance_wei().ok_or_else(|| {
			ChainError::Node(format!(
				"Invalid accounts balance: {}",
				accounts.accounts_balance
			))
		})?;

		let mut anvil = Anvil::new()
			.chain_id(network.chain_id)
			.mnemonic(accounts.effective_mnemonic())
			.timeout(SPAWN_TIMEOUT_MS)
			.args(anvil_args(network, balance)?);

		if let Some(path) = anvil_path {
			anvil = anvil.path(path);
		}

		if let Some(fork) = &network.forking {
			info!(url = %fork.url, block = ?fork.block_number, "Forking network");
			anvil = anvil.fork(fork.url.clone());
			if let Some(block) = fork.block_number {
				anvil = anvil.fork_block_number(block);
			}
		}

		let anvil = anvil
			.try_spawn()
			.map_err(|e| ChainError::Node(format!("Failed to spawn anvil: {}", e)))?;

		let mut signers = signers.into_iter();
		let mut wallet = EthereumWallet::from(
			signers
				.next()
				.ok_or_else(|| ChainError::Signer("No accounts derived".to_string()))?,
		);
		for signer in signers {
			wallet.register_signer(signer);
		}

		let provider = ProviderBuilder::new()
			.wallet(wallet)
			.connect_http(anvil.endpoint_url())
			.erased();
		let unsigned = ProviderBuilder::new()
			.connect_http(anvil.endpoint_url())
			.erased();

		info!(
			endpoint = %anvil.endpoint(),
			chain_id = network.chain_id,
			admin = %roles.admin,
			"Simulated node ready"
		);

		Ok(Self {
			anvil,
			provider,
			unsigned,
			roles,
		})
	}

	pub fn provider(&self) -> &DynProvider {
		&self.provider
	}

	pub fn unsigned_provider(&self) -> &DynProvider {
		&self.unsigned
	}

	pub fn roles(&self) -> Roles {
		self.roles
	}

	pub fn endpoint(&self) -> String {
		self.anvil.endpoint()
	}

	pub async fn block_number(&self) -> Result<u64, ChainError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| ChainError::Node(e.to_string()))
	}
}

/// Extra anvil flags derived from the network config.
pub fn anvil_args(network: &NetworkUserConfig, balance: U256) -> Result<Vec<String>, ChainError> {
	let accounts = &network.accounts;

	// anvil takes whole ether
	let ether = format_units(balance, "ether")
		.map_err(|e| ChainError::Node(format!("Invalid balance: {}", e)))?;
	let ether = ether.split('.').next().unwrap_or("0").to_string();

	Ok(vec![
		"--accounts".to_string(),
		(accounts.initial_index + accounts.count).to_string(),
		"--balance".to_string(),
		ether,
		"--derivation-path".to_string(),
		format!("{}/", accounts.path.trim_end_matches('/')),
		"--base-fee".to_string(),
		network.initial_base_fee_per_gas.to_string(),
		"--hardfork".to_string(),
		network.hardfork.clone(),
	])
}
