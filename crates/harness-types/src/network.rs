//! Named network profiles and their connection parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const GWEI: u128 = 1_000_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
	#[error("Unknown network profile: {0}")]
	UnknownNetwork(String),
}

/// Network profile name.
///
/// The set is closed: profile names coming from configuration or the
/// environment are parsed into this enum at startup, so a typo fails there
/// instead of producing an empty connection entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkId {
	Kovan,
	Ropsten,
	Main,
	Rinkeby,
	Goerli,
	Matic,
	Mumbai,
	Xdai,
	Avalanche,
	Fuji,
	Arbitrum1,
	RinkebyArbitrum1,
	Fantom,
	FantomTest,
	Bsc,
	BscTest,
	Oethereum,
	KovanOethereum,
	GoerliOethereum,
	Hardhat,
}

/// Connection parameters of a single network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDescriptor {
	pub rpc_url: &'static str,
	pub chain_id: u64,
	/// Default gas price in wei.
	pub default_gas_price: u128,
}

impl NetworkId {
	pub const ALL: [NetworkId; 20] = [
		NetworkId::Kovan,
		NetworkId::Ropsten,
		NetworkId::Main,
		NetworkId::Rinkeby,
		NetworkId::Goerli,
		NetworkId::Matic,
		NetworkId::Mumbai,
		NetworkId::Xdai,
		NetworkId::Avalanche,
		NetworkId::Fuji,
		NetworkId::Arbitrum1,
		NetworkId::RinkebyArbitrum1,
		NetworkId::Fantom,
		NetworkId::FantomTest,
		NetworkId::Bsc,
		NetworkId::BscTest,
		NetworkId::Oethereum,
		NetworkId::KovanOethereum,
		NetworkId::GoerliOethereum,
		NetworkId::Hardhat,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			NetworkId::Kovan => "kovan",
			NetworkId::Ropsten => "ropsten",
			NetworkId::Main => "main",
			NetworkId::Rinkeby => "rinkeby",
			NetworkId::Goerli => "goerli",
			NetworkId::Matic => "matic",
			NetworkId::Mumbai => "mumbai",
			NetworkId::Xdai => "xdai",
			NetworkId::Avalanche => "avalanche",
			NetworkId::Fuji => "fuji",
			NetworkId::Arbitrum1 => "arbitrum1",
			NetworkId::RinkebyArbitrum1 => "rinkeby_arbitrum1",
			NetworkId::Fantom => "fantom",
			NetworkId::FantomTest => "fantom_test",
			NetworkId::Bsc => "bsc",
			NetworkId::BscTest => "bsc_test",
			NetworkId::Oethereum => "oethereum",
			NetworkId::KovanOethereum => "kovan_oethereum",
			NetworkId::GoerliOethereum => "goerli_oethereum",
			NetworkId::Hardhat => "hardhat",
		}
	}

	/// The network whose descriptor backs this profile.
	///
	/// `rinkeby` and `goerli` have always routed to the mainnet endpoint.
	// TODO: confirm with the deployment owners whether these two profiles
	// should point at their own testnets before changing the routing.
	pub fn target(&self) -> NetworkId {
		match self {
			NetworkId::Rinkeby | NetworkId::Goerli => NetworkId::Main,
			other => *other,
		}
	}

	/// Whether this is the in-process simulated network.
	pub fn is_local(&self) -> bool {
		matches!(self, NetworkId::Hardhat)
	}

	pub fn descriptor(&self) -> NetworkDescriptor {
		let (rpc_url, chain_id, gas_gwei) = match self {
			NetworkId::Kovan => ("https://kovan.poa.network", 42, 65),
			NetworkId::Ropsten => ("https://rpc.ankr.com/eth_ropsten", 3, 65),
			NetworkId::Main | NetworkId::Rinkeby | NetworkId::Goerli => ("https://eth.llamarpc.com", 1, 65),
			NetworkId::Matic => ("https://polygon-rpc.com", 137, 1),
			NetworkId::Mumbai => ("https://rpc-mumbai.maticvigil.com", 80001, 1),
			NetworkId::Xdai => ("https://rpc.gnosischain.com", 100, 1),
			NetworkId::Avalanche => ("https://api.avax.network/ext/bc/C/rpc", 43114, 225),
			NetworkId::Fuji => ("https://api.avax-test.network/ext/bc/C/rpc", 43113, 85),
			NetworkId::Arbitrum1 => ("https://arb1.arbitrum.io/rpc", 42161, 1),
			NetworkId::RinkebyArbitrum1 => ("https://rinkeby.arbitrum.io/rpc", 421611, 1),
			NetworkId::Fantom => ("https://rpc.ftm.tools", 250, 1),
			NetworkId::FantomTest => ("https://rpc.testnet.fantom.network", 4002, 1),
			NetworkId::Bsc => ("https://bsc-dataseed.binance.org", 56, 8),
			NetworkId::BscTest => ("https://data-seed-prebsc-1-s1.binance.org:8545", 97, 8),
			NetworkId::Oethereum => ("https://mainnet.optimism.io", 10, 1),
			NetworkId::KovanOethereum => ("https://kovan.optimism.io", 69, 1),
			NetworkId::GoerliOethereum => ("https://goerli.optimism.io", 420, 1),
			NetworkId::Hardhat => ("http://127.0.0.1:8545", 31337, 65),
		};

		NetworkDescriptor {
			rpc_url,
			chain_id,
			default_gas_price: gas_gwei * GWEI,
		}
	}

	/// Environment variable that overrides this profile's RPC URL.
	pub fn rpc_env_var(&self) -> String {
		format!("RPC_URL_{}", self.as_str().to_uppercase())
	}
}

impl fmt::Display for NetworkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for NetworkId {
	type Err = NetworkError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		NetworkId::ALL
			.iter()
			.find(|id| id.as_str() == s.trim())
			.copied()
			.ok_or_else(|| NetworkError::UnknownNetwork(s.to_string()))
	}
}
