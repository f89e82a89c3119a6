//! Scenario results.

use alloy::primitives::{Address, U256};
use serde::Serialize;
use std::fmt;

use crate::clients::BalanceSlot;

/// How the harness ended up holding the deposit token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingOutcome {
	/// Harness already held at least the funding threshold.
	AlreadyFunded { balance: U256 },
	/// Balance was written directly into the token's storage.
	StorageWrite { slot: BalanceSlot, amount: U256 },
	/// Tokens were transferred from an impersonated whale.
	WhaleTransfer { whale: Address, amount: U256 },
}

impl fmt::Display for FundingOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FundingOutcome::StorageWrite { slot, amount } => {
				write!(f, "storage write of {} at slot {}", amount, slot)
			}
			FundingOutcome::AlreadyFunded { balance } => {
				write!(f, "already funded with {}", balance)
			}
			FundingOutcome::WhaleTransfer { whale, amount } => {
				write!(f, "transfer of {} from whale {}", amount, whale)
			}
		}
	}
}

/// Why a scenario did not run. A skip is not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
	/// The strategy would have to deposit more than one underlying token.
	MultipleUnderlyingTokens(usize),
	/// Descriptor lists no underlying token at all.
	NoUnderlyingToken,
	ZeroTotalSupply,
	ZeroVirtualPrice,
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SkipReason::MultipleUnderlyingTokens(n) => write!(
				f,
				"strategy requires depositing {} underlying tokens",
				n
			),
			SkipReason::NoUnderlyingToken => f.write_str("pool lists no underlying token"),
			SkipReason::ZeroTotalSupply => f.write_str("LP token total supply is zero"),
			SkipReason::ZeroVirtualPrice => f.write_str("pool virtual price is zero"),
		}
	}
}

/// Figures observed during a passing scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
	pub name: String,
	pub pool: Address,
	pub token: Address,
	pub funding: FundingOutcome,
	pub token_index: usize,
	pub deposit_amount: U256,
	pub lp_quote: U256,
	pub lp_after_deposit: U256,
	pub amount_in_token: U256,
	pub lp_after_withdraw: U256,
	pub token_after_withdraw: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
	Passed(ScenarioReport),
	Skipped(SkipReason),
}

/// Aggregate of one run over the pool registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
	pub passed: Vec<String>,
	pub skipped: Vec<(String, SkipReason)>,
	pub failed: Vec<(String, String)>,
}

impl RunSummary {
	pub fn total(&self) -> usize {
		self.passed.len() + self.skipped.len() + self.failed.len()
	}

	pub fn is_success(&self) -> bool {
		self.failed.is_empty()
	}
}

impl fmt::Display for RunSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} passed, {} skipped, {} failed",
			self.passed.len(),
			self.skipped.len(),
			self.failed.len()
		)
	}
}
