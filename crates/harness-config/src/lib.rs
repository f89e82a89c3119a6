// harness-config/src/lib.rs

use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod networks;
pub mod types;

pub use networks::*;
pub use types::*;

use harness_types::NetworkId;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "HARNESS_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<HarnessConfig, ConfigError> {
		let mut config = match &self.file_path {
			Some(path) => self.load_from_file(path).await?,
			None => {
				return Err(ConfigError::FileNotFound(
					"No configuration file specified".to_string(),
				))
			}
		};

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, path: &Path) -> Result<HarnessConfig, ConfigError> {
		info!("Loading configuration from {:?}", path);

		if !path.exists() {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}

		let content = tokio::fs::read_to_string(path).await?;
		let substituted = substitute_env_vars(&content)?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => from_toml(&substituted),
			Some("json") => serde_json::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(e.to_string())),
			Some("yaml") | Some("yml") => serde_yaml::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(e.to_string())),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}

	fn apply_env_overrides(&self, config: &mut HarnessConfig) -> Result<(), ConfigError> {
		let var = |name: &str| env::var(format!("{}{}", self.env_prefix, name)).ok();

		if let Some(network) = var("NETWORK") {
			debug!("Overriding network profile from environment");
			config.harness.network = parse_network(&network)?;
		}

		if let Some(mnemonic) = var("MNEMONIC") {
			debug!("Overriding mnemonic from environment");
			config.accounts.mnemonic = mnemonic;
		}

		if let Some(fork) = var("FORK") {
			debug!("Overriding fork network from environment");
			config.fork.network = if fork.trim().is_empty() {
				None
			} else {
				Some(parse_network(&fork)?)
			};
		}

		if let Some(block) = var("FORK_BLOCK_NUMBER") {
			config.fork.block_number = Some(block.trim().parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid fork block number: {}", e))
			})?);
		}

		if let Some(log_level) = var("LOG_LEVEL") {
			config.harness.log_level = log_level;
		}

		Ok(())
	}
}

/// Parse configuration from a TOML string
pub fn from_toml(contents: &str) -> Result<HarnessConfig, ConfigError> {
	toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Replace `${VAR_NAME}` patterns with environment values
pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}")
		.map_err(|e| ConfigError::ParseError(format!("Invalid substitution pattern: {}", e)))?;

	let mut result = content.to_string();
	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &value);
	}

	Ok(result)
}

fn parse_network(name: &str) -> Result<NetworkId, ConfigError> {
	name.parse()
		.map_err(|e: harness_types::NetworkError| ConfigError::ValidationError(e.to_string()))
}

/// Reject configurations the harness cannot run with
pub fn validate_config(config: &HarnessConfig) -> Result<(), ConfigError> {
	if config.accounts.count == 0 {
		return Err(ConfigError::ValidationError(
			"At least one funded account is required".to_string(),
		));
	}

	// admin, owner, deployer
	if config.accounts.count < 3 {
		return Err(ConfigError::ValidationError(format!(
			"Harness needs at least 3 accounts, got {}",
			config.accounts.count
		)));
	}

	if config.accounts.balance_wei().is_none() {
		return Err(ConfigError::ValidationError(format!(
			"Invalid accounts balance: {}",
			config.accounts.accounts_balance
		)));
	}

	if !config.accounts.path.starts_with("m/") {
		return Err(ConfigError::ValidationError(format!(
			"Derivation path must start with m/: {}",
			config.accounts.path
		)));
	}

	if let Some(NetworkId::Hardhat) = config.fork.network {
		return Err(ConfigError::ValidationError(
			"Cannot fork the simulated network itself".to_string(),
		));
	}

	let version = Regex::new(r"^\d+\.\d+\.\d+$")
		.map_err(|e| ConfigError::ParseError(format!("Invalid version pattern: {}", e)))?;
	if !version.is_match(&config.compiler.version) {
		return Err(ConfigError::ValidationError(format!(
			"Invalid compiler version: {}",
			config.compiler.version
		)));
	}

	if config.runner.pools_file.as_os_str().is_empty() {
		return Err(ConfigError::ValidationError(
			"Pool registry file must be set".to_string(),
		));
	}

	if config.runner.scenario_timeout_ms == 0 {
		return Err(ConfigError::ValidationError(
			"Scenario timeout must be greater than zero".to_string(),
		));
	}

	if config
		.runner
		.whale_gas_allowance
		.parse::<alloy::primitives::U256>()
		.is_err()
	{
		return Err(ConfigError::ValidationError(format!(
			"Invalid whale gas allowance: {}",
			config.runner.whale_gas_allowance
		)));
	}

	Ok(())
}

impl HarnessConfig {
	/// Connection config of the simulated network this run uses
	pub fn local_network(&self) -> NetworkUserConfig {
		local_config(
			self.harness.network,
			&self.accounts,
			build_fork_config(&self.fork),
		)
	}
}
