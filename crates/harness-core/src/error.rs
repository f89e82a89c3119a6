// harness-core/src/error.rs

use harness_types::{Address, ClientError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FundingError {
	#[error("Storage write failed and no whale is known for token {0}")]
	NoWhale(Address),

	#[error("Client error: {0}")]
	Client(#[from] ClientError),
}

#[derive(Error, Debug)]
pub enum ScenarioError {
	#[error("Assertion failed ({check}): expected {expected}, got {actual}")]
	Assertion {
		check: &'static str,
		expected: String,
		actual: String,
	},

	#[error("Funding failed: {0}")]
	Funding(#[from] FundingError),

	#[error("Client error: {0}")]
	Client(#[from] ClientError),

	#[error("Token {token} is not a coin of pool {pool}")]
	TokenNotInPool { token: Address, pool: Address },

	#[error("Pool {pool} has {coins} coins, only two-coin pools are supported")]
	UnsupportedPool { pool: Address, coins: usize },

	#[error("Adapter lists {len} underlying tokens, index {index} is out of range")]
	MissingUnderlying { index: usize, len: usize },

	#[error("Scenario timed out after {0:?}")]
	Timeout(Duration),
}
