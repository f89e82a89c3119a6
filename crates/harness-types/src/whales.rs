//! Known large holders used as a funding fallback.

use crate::pools::DataError;
use alloy::primitives::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Token address -> address observed holding a large balance of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WhaleRegistry {
	whales: HashMap<Address, Address>,
}

impl WhaleRegistry {
	pub fn from_json(contents: &str) -> Result<Self, DataError> {
		Ok(serde_json::from_str(contents)?)
	}

	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
			path: path.display().to_string(),
			source,
		})?;
		Self::from_json(&contents)
	}

	pub fn whale_for(&self, token: &Address) -> Option<Address> {
		self.whales.get(token).copied()
	}

	pub fn insert(&mut self, token: Address, whale: Address) {
		self.whales.insert(token, whale);
	}

	pub fn len(&self) -> usize {
		self.whales.len()
	}

	pub fn is_empty(&self) -> bool {
		self.whales.is_empty()
	}
}
