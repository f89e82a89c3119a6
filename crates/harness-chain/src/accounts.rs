//! Funded accounts derived from the configured mnemonic.

use crate::ChainError;
use alloy::primitives::Address;
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use harness_config::AccountsConfig;

/// Derives `count` signers starting at `initial_index`.
pub fn derive_signers(accounts: &AccountsConfig) -> Result<Vec<PrivateKeySigner>, ChainError> {
	let path = accounts.path.trim_end_matches('/');

	(accounts.initial_index..accounts.initial_index + accounts.count)
		.map(|index| {
			MnemonicBuilder::<English>::default()
				.phrase(accounts.effective_mnemonic())
				.derivation_path(format!("{}/{}", path, index))
				.and_then(|builder| builder.build())
				.map_err(|e| ChainError::Signer(format!("Failed to derive account {}: {}", index, e)))
		})
		.collect()
}

/// Well-known roles, by position in the derived account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles {
	pub admin: Address,
	pub owner: Address,
	pub deployer: Address,
	pub alice: Option<Address>,
}

impl Roles {
	pub fn from_signers(signers: &[PrivateKeySigner]) -> Result<Self, ChainError> {
		let address = |i: usize| {
			signers
				.get(i)
				.map(|s| s.address())
				.ok_or_else(|| ChainError::Signer(format!("Missing account {}", i)))
		};

		Ok(Self {
			admin: address(0)?,
			owner: address(1)?,
			deployer: address(2)?,
			alice: signers.get(3).map(|s| s.address()),
		})
	}
}
