//! Deposit/withdraw behaviour checks for one pool.
//!
//! A scenario funds the harness with the pool's deposit token, skips pools
//! the adapter cannot be exercised against, then deposits everything through
//! the adapter and withdraws it again, cross-checking the adapter's view of
//! balances against the token and pool contracts after each step.

use crate::checks::{expect_at_least_percent, expect_eq};
use crate::error::ScenarioError;
use crate::funding::{fund_harness, pow10, FundingPlan};
use harness_types::{
	Address, ContractFactory, PoolDescriptor, ScenarioOutcome, ScenarioReport, SkipReason,
	WhaleRegistry, U256,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Minimum share of the pool's own quote the adapter must report after depositing.
pub const MIN_QUOTE_PERCENT: u64 = 95;

pub struct Verifier {
	factory: Arc<dyn ContractFactory>,
	whales: WhaleRegistry,
	funding: FundingPlan,
}

impl Verifier {
	pub fn new(factory: Arc<dyn ContractFactory>, whales: WhaleRegistry, funding: FundingPlan) -> Self {
		Self {
			factory,
			whales,
			funding,
		}
	}

	pub fn factory(&self) -> &Arc<dyn ContractFactory> {
		&self.factory
	}

	/// Runs the full scenario for `pool`.
	///
	/// Returns `Ok(Skipped)` when the pool cannot be exercised, and an error
	/// on the first failed check.
	pub async fn run_scenario(
		&self,
		name: &str,
		pool: &PoolDescriptor,
	) -> Result<ScenarioOutcome, ScenarioError> {
		let Some(token) = pool.deposit_token() else {
			return Ok(ScenarioOutcome::Skipped(SkipReason::NoUnderlyingToken));
		};

		let funding = fund_harness(self.factory.as_ref(), &self.whales, &self.funding, token).await?;
		debug!(%token, %funding, "Harness funded");

		if pool.tokens.len() > 1 {
			info!(tokens = pool.tokens.len(), "Skipping, strategy deposits more than one underlying token");
			return Ok(ScenarioOutcome::Skipped(SkipReason::MultipleUnderlyingTokens(
				pool.tokens.len(),
			)));
		}

		let harness = self.factory.harness();
		let adapter = self.factory.adapter();
		let curve_pool = self.factory.crypto_pool(pool.pool);
		let lp_token = self.factory.token(pool.lp_token);
		let deposit_token = self.factory.token(token);
		let vault = harness.address();

		harness
			.give_allowances(vec![token, pool.lp_token], vec![pool.pool, pool.pool])
			.await?;

		let total_supply = lp_token.total_supply().await?;
		if total_supply.is_zero() {
			info!("Skipping, LP total supply is zero");
			return Ok(ScenarioOutcome::Skipped(SkipReason::ZeroTotalSupply));
		}
		let virtual_price = curve_pool.virtual_price().await?;
		if virtual_price.is_zero() {
			info!("Skipping, virtual price is zero");
			return Ok(ScenarioOutcome::Skipped(SkipReason::ZeroVirtualPrice));
		}

		let coins = self.factory.pool_factory().coins(pool.pool).await?;
		let token_index = token_index(&coins, token, pool.pool)?;

		let pool_value = virtual_price * total_supply / pow10(18);
		let balance = deposit_token.balance_of(vault).await?;
		let deposit_amount = balance.min(pool_value);
		let mut amounts = [U256::ZERO; 2];
		amounts[token_index] = deposit_amount;

		let lp_quote = curve_pool.calc_token_amount(amounts).await?;
		debug!(%token_index, %deposit_amount, %pool_value, %lp_quote, "Depositing");

		harness.deposit_all(token, pool.pool, adapter.address()).await?;

		let lp_after_deposit = adapter
			.liquidity_pool_token_balance(vault, vault, pool.pool)
			.await?;
		expect_at_least_percent(
			"lp balance against quote after deposit",
			lp_after_deposit,
			lp_quote,
			MIN_QUOTE_PERCENT,
		)?;
		expect_eq(
			"lp balance after deposit",
			lp_after_deposit,
			lp_token.balance_of(vault).await?,
		)?;

		let underlying = self.underlying_at(pool.pool, token_index).await?;
		expect_eq(
			"underlying balance after deposit",
			harness.token_balance(underlying, vault).await?,
			deposit_token.balance_of(vault).await?,
		)?;

		let amount_in_token = adapter
			.all_amount_in_token(vault, token, pool.pool)
			.await?;
		expect_eq(
			"amount in token after deposit",
			amount_in_token,
			curve_pool
				.calc_withdraw_one_coin(lp_after_deposit, token_index)
				.await?,
		)?;

		harness.withdraw_all(token, pool.pool, adapter.address()).await?;

		let lp_after_withdraw = adapter
			.liquidity_pool_token_balance(vault, vault, pool.pool)
			.await?;
		expect_eq(
			"lp balance after withdraw",
			lp_after_withdraw,
			lp_token.balance_of(vault).await?,
		)?;

		let underlying = self.underlying_at(pool.pool, token_index).await?;
		let token_after_withdraw = deposit_token.balance_of(vault).await?;
		expect_eq(
			"underlying balance after withdraw",
			harness.token_balance(underlying, vault).await?,
			token_after_withdraw,
		)?;

		info!(%lp_after_deposit, %amount_in_token, %token_after_withdraw, "Scenario passed");

		Ok(ScenarioOutcome::Passed(ScenarioReport {
			name: name.to_string(),
			pool: pool.pool,
			token,
			funding,
			token_index,
			deposit_amount,
			lp_quote,
			lp_after_deposit,
			amount_in_token,
			lp_after_withdraw,
			token_after_withdraw,
		}))
	}

	// The adapter is asked with the pool address in both positions.
	async fn underlying_at(&self, pool: Address, index: usize) -> Result<Address, ScenarioError> {
		let tokens = self.factory.adapter().underlying_tokens(pool, pool).await?;
		tokens
			.get(index)
			.copied()
			.ok_or(ScenarioError::MissingUnderlying {
				index,
				len: tokens.len(),
			})
	}
}

fn token_index(coins: &[Address], token: Address, pool: Address) -> Result<usize, ScenarioError> {
	if coins.len() != 2 {
		return Err(ScenarioError::UnsupportedPool {
			pool,
			coins: coins.len(),
		});
	}
	coins
		.iter()
		.position(|coin| *coin == token)
		.ok_or(ScenarioError::TokenNotInPool { token, pool })
}
