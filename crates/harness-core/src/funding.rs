//! Getting the deposit token into the harness.
//!
//! Two paths, tried in order: write the balance straight into the token's
//! storage, or have a known whale transfer it. The second path only runs
//! when the first returns an error.

use crate::error::FundingError;
use harness_types::{Address, ContractFactory, FundingOutcome, WhaleRegistry, U256};
use tracing::{debug, info, warn};

/// Decimals the whale transfer is scaled down by.
const WHALE_TRANSFER_SCALE_DOWN: u8 = 6;

#[derive(Debug, Clone)]
pub struct FundingPlan {
	/// Whole tokens written by the storage shortcut
	pub storage_units: u64,
	/// Native currency sent to a whale for gas, in wei
	pub whale_gas_allowance: U256,
}

impl Default for FundingPlan {
	fn default() -> Self {
		Self {
			storage_units: 10_000,
			whale_gas_allowance: U256::from(100u64) * pow10(18),
		}
	}
}

pub(crate) fn pow10(exp: u8) -> U256 {
	U256::from(10u64).pow(U256::from(exp))
}

/// Balance below which the harness counts as unfunded: one whole token.
pub fn funding_threshold(decimals: u8) -> U256 {
	pow10(decimals)
}

/// Amount a whale sends: `10^(decimals - 6)` base units.
pub fn whale_transfer_amount(decimals: u8) -> U256 {
	pow10(decimals.saturating_sub(WHALE_TRANSFER_SCALE_DOWN))
}

/// Ensures the harness holds `token`.
pub async fn fund_harness(
	factory: &dyn ContractFactory,
	whales: &WhaleRegistry,
	plan: &FundingPlan,
	token: Address,
) -> Result<FundingOutcome, FundingError> {
	let token_client = factory.token(token);
	let harness = factory.harness().address();

	let decimals = token_client.decimals().await?;
	let balance = token_client.balance_of(harness).await?;
	if balance >= funding_threshold(decimals) {
		debug!(%token, %balance, "Harness already funded");
		return Ok(FundingOutcome::AlreadyFunded { balance });
	}

	let amount = U256::from(plan.storage_units) * pow10(decimals);
	match factory
		.chain()
		.set_token_balance(token, harness, amount)
		.await
	{
		Ok(slot) => {
			info!(%token, %slot, %amount, "Funded harness through storage");
			Ok(FundingOutcome::StorageWrite { slot, amount })
		}
		Err(e) => {
			info!(%token, error = %e, "Storage write unavailable, falling back to whale");
			fund_from_whale(factory, whales, plan, token, decimals).await
		}
	}
}

async fn fund_from_whale(
	factory: &dyn ContractFactory,
	whales: &WhaleRegistry,
	plan: &FundingPlan,
	token: Address,
	decimals: u8,
) -> Result<FundingOutcome, FundingError> {
	let whale = whales
		.whale_for(&token)
		.ok_or(FundingError::NoWhale(token))?;
	let token_client = factory.token(token);
	let harness = factory.harness().address();
	let chain = factory.chain();

	debug!(
		%whale,
		whale_balance = %token_client.balance_of(whale).await?,
		"Whale balance before"
	);

	chain.impersonate(whale).await?;

	let amount = whale_transfer_amount(decimals);
	let transferred = match chain.send_native(whale, plan.whale_gas_allowance).await {
		Ok(()) => token_client.transfer_as(whale, harness, amount).await,
		Err(e) => Err(e),
	};

	if let Err(e) = chain.stop_impersonating(whale).await {
		warn!(%whale, error = %e, "Failed to stop impersonating whale");
	}
	transferred?;

	info!(
		%token,
		%whale,
		%amount,
		harness_balance = %token_client.balance_of(harness).await?,
		"Funded harness from whale"
	);
	Ok(FundingOutcome::WhaleTransfer { whale, amount })
}
