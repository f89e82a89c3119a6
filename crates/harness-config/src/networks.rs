//! Per-network connection configuration.

use crate::types::{AccountsConfig, ForkSettings};
use harness_types::NetworkId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hardfork of the named networks.
pub const HARDFORK: &str = "london";

/// Hardfork of the simulated network.
pub const LOCAL_HARDFORK: &str = "merge";

/// Initial base fee per gas, in wei.
pub const INITIAL_BASE_FEE_PER_GAS: u128 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GasPrice {
	/// Let the node price transactions
	Auto,
}

/// Upstream the simulated network forks from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForkConfig {
	pub url: String,
	pub block_number: Option<u64>,
}

/// Resolved connection parameters for one network profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkUserConfig {
	pub name: NetworkId,
	/// `None` for the simulated network
	pub url: Option<String>,
	pub hardfork: String,
	pub gas_price: GasPrice,
	pub chain_id: u64,
	pub initial_base_fee_per_gas: u128,
	pub accounts: AccountsConfig,
	pub forking: Option<ForkConfig>,
}

/// RPC URL of a profile, honouring the `RPC_URL_<PROFILE>` override.
pub fn rpc_url(network: NetworkId) -> String {
	let var = network.rpc_env_var();
	match std::env::var(&var) {
		Ok(url) if !url.trim().is_empty() => {
			debug!("Overriding RPC URL for {} from {}", network, var);
			url
		}
		_ => network.descriptor().rpc_url.to_string(),
	}
}

/// Connection config shared by every named network.
pub fn network_config(network: NetworkId, accounts: &AccountsConfig) -> NetworkUserConfig {
	let descriptor = network.descriptor();

	NetworkUserConfig {
		name: network,
		url: Some(rpc_url(network.target())),
		hardfork: HARDFORK.to_string(),
		gas_price: GasPrice::Auto,
		chain_id: descriptor.chain_id,
		initial_base_fee_per_gas: INITIAL_BASE_FEE_PER_GAS,
		accounts: accounts.clone(),
		forking: None,
	}
}

/// The simulated network, adopting `profile`'s chain ID.
pub fn local_config(
	profile: NetworkId,
	accounts: &AccountsConfig,
	fork: Option<ForkConfig>,
) -> NetworkUserConfig {
	NetworkUserConfig {
		name: NetworkId::Hardhat,
		url: None,
		hardfork: LOCAL_HARDFORK.to_string(),
		gas_price: GasPrice::Auto,
		chain_id: profile.descriptor().chain_id,
		initial_base_fee_per_gas: INITIAL_BASE_FEE_PER_GAS,
		accounts: accounts.clone(),
		forking: fork,
	}
}

/// Fork source from settings, `None` when forking is disabled.
pub fn build_fork_config(settings: &ForkSettings) -> Option<ForkConfig> {
	let url = match (&settings.url, settings.network) {
		(Some(url), _) => url.clone(),
		(None, Some(network)) => rpc_url(network.target()),
		(None, None) => return None,
	};

	Some(ForkConfig {
		url,
		block_number: settings.block_number,
	})
}

/// The full table of named networks.
pub fn all_networks(accounts: &AccountsConfig) -> Vec<NetworkUserConfig> {
	NetworkId::ALL
		.iter()
		.filter(|id| !id.is_local())
		.map(|id| network_config(*id, accounts))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_network_config() {
		let accounts = AccountsConfig::default();
		let config = network_config(NetworkId::Matic, &accounts);

		assert_eq!(config.chain_id, 137);
		assert_eq!(config.hardfork, "london");
		assert_eq!(config.gas_price, GasPrice::Auto);
		assert_eq!(config.initial_base_fee_per_gas, 100_000_000);
		assert_eq!(config.accounts.count, 20);
		assert!(config.forking.is_none());
	}

	#[test]
	fn test_aliases_share_main_endpoint() {
		let accounts = AccountsConfig::default();
		let main = network_config(NetworkId::Main, &accounts);
		let rinkeby = network_config(NetworkId::Rinkeby, &accounts);
		let goerli = network_config(NetworkId::Goerli, &accounts);

		assert_eq!(rinkeby.url, main.url);
		assert_eq!(goerli.url, main.url);
		assert_eq!(rinkeby.chain_id, 1);
		assert_eq!(rinkeby.name, NetworkId::Rinkeby);
	}

	#[test]
	fn test_local_config_adopts_profile_chain_id() {
		let accounts = AccountsConfig::default();
		let config = local_config(NetworkId::Main, &accounts, None);

		assert_eq!(config.name, NetworkId::Hardhat);
		assert_eq!(config.chain_id, 1);
		assert_eq!(config.hardfork, "merge");
		assert!(config.url.is_none());
	}

	#[test]
	fn test_fork_disabled_by_default() {
		assert!(build_fork_config(&ForkSettings::default()).is_none());
	}

	#[test]
	fn test_fork_explicit_url_wins() {
		let settings = ForkSettings {
			network: Some(NetworkId::Main),
			block_number: Some(14_000_000),
			url: Some("http://archive.local:8545".to_string()),
		};

		let fork = build_fork_config(&settings).unwrap();
		assert_eq!(fork.url, "http://archive.local:8545");
		assert_eq!(fork.block_number, Some(14_000_000));
	}

	#[test]
	fn test_fork_from_network_table() {
		let settings = ForkSettings {
			network: Some(NetworkId::Avalanche),
			block_number: None,
			url: None,
		};

		let fork = build_fork_config(&settings).unwrap();
		assert_eq!(fork.url, rpc_url(NetworkId::Avalanche));
		assert!(fork.block_number.is_none());
	}

	#[test]
	fn test_all_networks_excludes_local() {
		let networks = all_networks(&AccountsConfig::default());
		assert_eq!(networks.len(), 19);
		assert!(networks.iter().all(|n| n.name != NetworkId::Hardhat));
	}
}
