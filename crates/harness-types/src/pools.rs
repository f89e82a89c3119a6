//! Curve pool descriptors and the static registry they are loaded from.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading static data files.
#[derive(Debug, Error)]
pub enum DataError {
	#[error("IO error reading {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Parse error: {0}")]
	Parse(#[from] serde_json::Error),
}

/// A Curve pool together with its LP token and underlying tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescriptor {
	pub pool: Address,
	#[serde(rename = "lpToken")]
	pub lp_token: Address,
	/// Ordered underlying tokens. The first entry is the one deposited.
	pub tokens: Vec<Address>,
}

impl PoolDescriptor {
	pub fn deposit_token(&self) -> Option<Address> {
		self.tokens.first().copied()
	}
}

/// Named pool descriptors, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolRegistry {
	pools: BTreeMap<String, PoolDescriptor>,
}

impl PoolRegistry {
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

	pub fn get(&self, name: &str) -> Option<&PoolDescriptor> {
		self.pools.get(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &PoolDescriptor)> {
		self.pools.iter()
	}

	pub fn len(&self) -> usize {
		self.pools.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pools.is_empty()
	}

	/// Keeps only the named entry, if any name is given.
	pub fn retain_named(&mut self, name: Option<&str>) {
		if let Some(name) = name {
			self.pools.retain(|key, _| key == name);
		}
	}
}

impl FromIterator<(String, PoolDescriptor)> for PoolRegistry {
	fn from_iter<T: IntoIterator<Item = (String, PoolDescriptor)>>(iter: T) -> Self {
		Self {
			pools: iter.into_iter().collect(),
		}
	}
}
