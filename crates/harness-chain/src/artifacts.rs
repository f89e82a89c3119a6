//! Compiled contract artifacts and their deployment.

use crate::ChainError;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The part of a Hardhat artifact the harness needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
	#[serde(rename = "contractName")]
	pub contract_name: String,
	pub bytecode: Bytes,
}

impl Artifact {
	pub fn from_json(contents: &str) -> Result<Self, ChainError> {
		serde_json::from_str(contents)
			.map_err(|e| ChainError::Artifact(format!("Invalid artifact: {}", e)))
	}

	/// Creation code followed by the ABI-encoded constructor arguments.
	pub fn deploy_code(&self, constructor_args: &[u8]) -> Result<Bytes, ChainError> {
		if self.bytecode.is_empty() {
			return Err(ChainError::Artifact(format!(
				"{} has no byte-code (abstract contract or interface?)",
				self.contract_name
			)));
		}

		Ok([self.bytecode.as_ref(), constructor_args].concat().into())
	}
}

/// Locates `<name>.json` under `dir`, descending into sub-directories.
pub fn find_artifact(dir: &Path, name: &str) -> Result<PathBuf, ChainError> {
	let file_name = format!("{}.json", name);

	let direct = dir.join(&file_name);
	if direct.is_file() {
		return Ok(direct);
	}

	let mut pending = vec![dir.to_path_buf()];
	while let Some(current) = pending.pop() {
		let entries = std::fs::read_dir(&current).map_err(|e| {
			ChainError::Artifact(format!("Cannot read {}: {}", current.display(), e))
		})?;

		for entry in entries.flatten() {
			let path = entry.path();
			if path.is_dir() {
				pending.push(path);
			} else if path.file_name().and_then(|f| f.to_str()) == Some(file_name.as_str()) {
				return Ok(path);
			}
		}
	}

	Err(ChainError::Artifact(format!(
		"Artifact {} not found under {}",
		name,
		dir.display()
	)))
}

pub fn load_artifact(dir: &Path, name: &str) -> Result<Artifact, ChainError> {
	let path = find_artifact(dir, name)?;
	debug!("Reading artifact {:?}", path);

	let contents = std::fs::read_to_string(&path)
		.map_err(|e| ChainError::Artifact(format!("Cannot read {}: {}", path.display(), e)))?;
	Artifact::from_json(&contents)
}

/// Deploys `artifact` from `from` and returns the contract address.
pub async fn deploy(
	provider: &DynProvider,
	from: Address,
	artifact: &Artifact,
	constructor_args: &[u8],
) -> Result<Address, ChainError> {
	let request = TransactionRequest::default()
		.with_from(from)
		.with_deploy_code(artifact.deploy_code(constructor_args)?);

	let receipt = provider
		.send_transaction(request)
		.await
		.map_err(|e| ChainError::Deployment(format!("{}: {}", artifact.contract_name, e)))?
		.get_receipt()
		.await
		.map_err(|e| ChainError::Deployment(format!("{}: {}", artifact.contract_name, e)))?;

	if !receipt.status() {
		return Err(ChainError::Deployment(format!(
			"{} deployment reverted",
			artifact.contract_name
		)));
	}

	let address = receipt.contract_address.ok_or_else(|| {
		ChainError::Deployment(format!("{}: no contract address", artifact.contract_name))
	})?;

	info!(contract = %artifact.contract_name, %address, "Deployed");
	Ok(address)
}
