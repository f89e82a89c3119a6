//! Configuration types for the harness.

use alloy::primitives::{address, Address, U256};
use harness_types::NetworkId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mnemonic used when none is configured. Derives the usual anvil accounts.
pub const DEFAULT_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Complete harness configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarnessConfig {
	pub harness: HarnessSettings,
	/// Funded accounts on the simulated network
	pub accounts: AccountsConfig,
	/// Fork source for the simulated network
	#[serde(default)]
	pub fork: ForkSettings,
	/// Contract compiler settings the artifacts were built with
	pub compiler: CompilerConfig,
	pub paths: PathsConfig,
	pub runner: RunnerConfig,
	/// Adapter deployment parameters
	pub adapter: AdapterConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarnessSettings {
	/// Network profile whose chain ID the simulated network adopts
	pub network: NetworkId,
	pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountsConfig {
	/// Empty means the default test mnemonic
	#[serde(default)]
	pub mnemonic: String,
	/// Derivation path prefix, the account index is appended
	pub path: String,
	pub initial_index: u32,
	pub count: u32,
	/// Balance of every account, in wei
	pub accounts_balance: String,
}

impl AccountsConfig {
	pub fn effective_mnemonic(&self) -> &str {
		if self.mnemonic.trim().is_empty() {
			DEFAULT_MNEMONIC
		} else {
			self.mnemonic.trim()
		}
	}

	pub fn balance_wei(&self) -> Option<U256> {
		self.accounts_balance.parse().ok()
	}
}

impl Default for AccountsConfig {
	fn default() -> Self {
		Self {
			mnemonic: String::new(),
			path: "m/44'/60'/0'/0".to_string(),
			initial_index: 0,
			count: 20,
			accounts_balance: "10000000000000000000000".to_string(),
		}
	}
}

/// Which live network the simulation mirrors
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForkSettings {
	/// Network to fork, forking is disabled when unset
	pub network: Option<NetworkId>,
	/// Pin the fork to a block, latest when unset
	pub block_number: Option<u64>,
	/// Explicit upstream URL, overrides the network table
	pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompilerConfig {
	pub version: String,
	pub optimizer: OptimizerConfig,
	/// Metadata hash appended to byte-code ("none" to omit)
	pub bytecode_hash: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptimizerConfig {
	pub enabled: bool,
	pub runs: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
	/// Compiled contract artifacts
	pub artifacts: PathBuf,
	pub cache: PathBuf,
	pub sources: PathBuf,
	pub tests: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
	/// Whole-run timeout in milliseconds, 0 means unbounded
	pub timeout_ms: u64,
	/// Per-scenario timeout in milliseconds
	pub scenario_timeout_ms: u64,
	/// Pool descriptor registry (JSON)
	pub pools_file: PathBuf,
	/// Token -> whale registry (JSON)
	pub whales_file: PathBuf,
	/// Whole tokens written into the harness balance by the storage shortcut
	pub funding_amount: u64,
	/// Native currency sent to a whale before it transfers, in wei
	pub whale_gas_allowance: String,
	/// anvil binary, looked up on PATH when unset
	pub anvil_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdapterConfig {
	/// Artifact name of the adapter under test
	pub artifact: String,
	/// Artifact name of the test harness contract
	pub harness_artifact: String,
	/// Registry passed to the adapter constructor
	pub registry: Address,
	/// Curve crypto pool factory
	pub curve_factory: Address,
	/// Curve meta registry
	pub curve_meta_registry: Address,
	/// Gas limit applied to harness transactions
	pub gas_limit: Option<u64>,
}

impl Default for HarnessConfig {
	fn default() -> Self {
		Self {
			harness: HarnessSettings {
				network: NetworkId::Hardhat,
				log_level: "info".to_string(),
			},
			accounts: AccountsConfig::default(),
			fork: ForkSettings::default(),
			compiler: CompilerConfig {
				version: "0.8.11".to_string(),
				optimizer: OptimizerConfig {
					enabled: true,
					runs: 200,
				},
				bytecode_hash: "none".to_string(),
			},
			paths: PathsConfig {
				artifacts: PathBuf::from("./artifacts"),
				cache: PathBuf::from("./cache"),
				sources: PathBuf::from("./contracts"),
				tests: PathBuf::from("./test"),
			},
			runner: RunnerConfig {
				timeout_ms: 0,
				scenario_timeout_ms: 100_000,
				pools_file: PathBuf::from("./data/curve_crypto_pools.json"),
				whales_file: PathBuf::from("./data/whales.json"),
				funding_amount: 10_000,
				whale_gas_allowance: "100000000000000000000".to_string(),
				anvil_path: None,
			},
			adapter: AdapterConfig {
				artifact: "CurveCryptoPoolAdapter".to_string(),
				harness_artifact: "TestDeFiAdapter".to_string(),
				registry: address!("99fa011e33a8c6196869dec7bc407e896ba67fe3"),
				curve_factory: address!("F18056Bbd320E96A48e3Fbf8bC061322531aac99"),
				curve_meta_registry: address!("F98B45FA17DE75FB1aD0e7aFD971b0ca00e379fC"),
				gas_limit: None,
			},
		}
	}
}
