//! Alloy-backed implementations of the contract client traits.

use crate::bindings::{
	ICurveCryptoPool, ICurveCryptoPoolAdapter, ICurveFactory, IERC20, ITestDeFiAdapter,
};
use crate::storage;
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::providers::{ext::AnvilApi, DynProvider, PendingTransactionBuilder, Provider};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use harness_types::{
	AdapterClient, BalanceSlot, ChainControl, ClientError, ContractFactory, CryptoPoolClient,
	HarnessClient, PoolFactoryClient, TokenClient,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

fn call_error(e: alloy::contract::Error) -> ClientError {
	ClientError::Call(e.to_string())
}

/// Waits for the receipt and turns a failed status into an error.
async fn confirm(pending: PendingTransactionBuilder<Ethereum>, what: &str) -> Result<(), ClientError> {
	let receipt = pending
		.get_receipt()
		.await
		.map_err(|e| ClientError::Transaction(format!("{}: {}", what, e)))?;

	if !receipt.status() {
		return Err(ClientError::Reverted(format!(
			"{} (tx {})",
			what, receipt.transaction_hash
		)));
	}

	debug!(tx = %receipt.transaction_hash, gas = receipt.gas_used, "{} confirmed", what);
	Ok(())
}

pub struct AlloyToken {
	address: Address,
	provider: DynProvider,
	unsigned: DynProvider,
}

#[async_trait]
impl TokenClient for AlloyToken {
	fn address(&self) -> Address {
		self.address
	}

	async fn decimals(&self) -> Result<u8, ClientError> {
		IERC20::new(self.address, self.provider.clone())
			.decimals()
			.call()
			.await
			.map_err(call_error)
	}

	async fn balance_of(&self, holder: Address) -> Result<U256, ClientError> {
		IERC20::new(self.address, self.provider.clone())
			.balanceOf(holder)
			.call()
			.await
			.map_err(call_error)
	}

	async fn total_supply(&self) -> Result<U256, ClientError> {
		IERC20::new(self.address, self.provider.clone())
			.totalSupply()
			.call()
			.await
			.map_err(call_error)
	}

	async fn transfer_as(
		&self,
		holder: Address,
		to: Address,
		amount: U256,
	) -> Result<(), ClientError> {
		// The node signs for impersonated accounts, so bypass the local wallet
		let pending = IERC20::new(self.address, self.unsigned.clone())
			.transfer(to, amount)
			.from(holder)
			.send()
			.await
			.map_err(|e| ClientError::Transaction(format!("transfer: {}", e)))?;

		confirm(pending, "transfer").await
	}
}

pub struct AlloyCryptoPool {
	contract: ICurveCryptoPool::ICurveCryptoPoolInstance<DynProvider>,
}

#[async_trait]
impl CryptoPoolClient for AlloyCryptoPool {
	fn address(&self) -> Address {
		*self.contract.address()
	}

	async fn virtual_price(&self) -> Result<U256, ClientError> {
		self.contract
			.get_virtual_price()
			.call()
			.await
			.map_err(call_error)
	}

	async fn calc_token_amount(&self, amounts: [U256; 2]) -> Result<U256, ClientError> {
		self.contract
			.calc_token_amount(amounts)
			.call()
			.await
			.map_err(call_error)
	}

	async fn calc_withdraw_one_coin(
		&self,
		lp_amount: U256,
		index: usize,
	) -> Result<U256, ClientError> {
		self.contract
			.calc_withdraw_one_coin(lp_amount, U256::from(index))
			.call()
			.await
			.map_err(call_error)
	}
}

pub struct AlloyPoolFactory {
	contract: ICurveFactory::ICurveFactoryInstance<DynProvider>,
}

#[async_trait]
impl PoolFactoryClient for AlloyPoolFactory {
	async fn coins(&self, pool: Address) -> Result<Vec<Address>, ClientError> {
		let coins = self
			.contract
			.get_coins(pool)
			.call()
			.await
			.map_err(call_error)?;
		Ok(coins.to_vec())
	}
}

pub struct AlloyAdapter {
	contract: ICurveCryptoPoolAdapter::ICurveCryptoPoolAdapterInstance<DynProvider>,
}

#[async_trait]
impl AdapterClient for AlloyAdapter {
	fn address(&self) -> Address {
		*self.contract.address()
	}

	async fn liquidity_pool_token_balance(
		&self,
		vault: Address,
		underlying_token: Address,
		pool: Address,
	) -> Result<U256, ClientError> {
		self.contract
			.getLiquidityPoolTokenBalance(vault, underlying_token, pool)
			.call()
			.await
			.map_err(call_error)
	}

	async fn underlying_tokens(
		&self,
		pool: Address,
		lp_token: Address,
	) -> Result<Vec<Address>, ClientError> {
		self.contract
			.getUnderlyingTokens(pool, lp_token)
			.call()
			.await
			.map_err(call_error)
	}

	async fn all_amount_in_token(
		&self,
		vault: Address,
		underlying_token: Address,
		pool: Address,
	) -> Result<U256, ClientError> {
		self.contract
			.getAllAmountInToken(vault, underlying_token, pool)
			.call()
			.await
			.map_err(call_error)
	}
}

pub struct AlloyHarness {
	contract: ITestDeFiAdapter::ITestDeFiAdapterInstance<DynProvider>,
	sender: Address,
	gas_limit: Option<u64>,
}

#[async_trait]
impl HarnessClient for AlloyHarness {
	fn address(&self) -> Address {
		*self.contract.address()
	}

	async fn give_allowances(
		&self,
		tokens: Vec<Address>,
		spenders: Vec<Address>,
	) -> Result<(), ClientError> {
		let mut call = self.contract.giveAllowances(tokens, spenders).from(self.sender);
		if let Some(gas) = self.gas_limit {
			call = call.gas(gas);
		}

		let pending = call
			.send()
			.await
			.map_err(|e| ClientError::Transaction(format!("giveAllowances: {}", e)))?;
		confirm(pending, "giveAllowances").await
	}

	async fn deposit_all(
		&self,
		underlying_token: Address,
		pool: Address,
		adapter: Address,
	) -> Result<(), ClientError> {
		let mut call = self
			.contract
			.testGetDepositAllCodes(underlying_token, pool, adapter)
			.from(self.sender);
		if let Some(gas) = self.gas_limit {
			call = call.gas(gas);
		}

		let pending = call
			.send()
			.await
			.map_err(|e| ClientError::Transaction(format!("deposit all: {}", e)))?;
		confirm(pending, "deposit all").await
	}

	async fn withdraw_all(
		&self,
		underlying_token: Address,
		pool: Address,
		adapter: Address,
	) -> Result<(), ClientError> {
		let mut call = self
			.contract
			.testGetWithdrawAllCodes(underlying_token, pool, adapter)
			.from(self.sender);
		if let Some(gas) = self.gas_limit {
			call = call.gas(gas);
		}

		let pending = call
			.send()
			.await
			.map_err(|e| ClientError::Transaction(format!("withdraw all: {}", e)))?;
		confirm(pending, "withdraw all").await
	}

	async fn token_balance(&self, token: Address, account: Address) -> Result<U256, ClientError> {
		self.contract
			.getERC20TokenBalance(token, account)
			.call()
			.await
			.map_err(call_error)
	}
}

/// Cheat operations against anvil.
pub struct AnvilControl {
	provider: DynProvider,
	admin: Address,
	/// Balance slots found so far, per token.
	slots: Mutex<HashMap<Address, BalanceSlot>>,
}

impl AnvilControl {
	pub fn new(provider: DynProvider, admin: Address) -> Self {
		Self {
			provider,
			admin,
			slots: Mutex::new(HashMap::new()),
		}
	}

	fn known_slot(&self, token: &Address) -> Option<BalanceSlot> {
		self.slots.lock().ok().and_then(|slots| slots.get(token).copied())
	}

	fn remember_slot(&self, token: Address, slot: BalanceSlot) {
		if let Ok(mut slots) = self.slots.lock() {
			slots.insert(token, slot);
		}
	}
}

#[async_trait]
impl ChainControl for AnvilControl {
	async fn set_token_balance(
		&self,
		token: Address,
		holder: Address,
		amount: U256,
	) -> Result<BalanceSlot, ClientError> {
		let slot = storage::set_token_balance(
			&self.provider,
			token,
			holder,
			amount,
			self.known_slot(&token),
		)
		.await?;

		self.remember_slot(token, slot);
		Ok(slot)
	}

	async fn impersonate(&self, account: Address) -> Result<(), ClientError> {
		self.provider
			.anvil_impersonate_account(account)
			.await
			.map_err(|e| ClientError::Node(format!("impersonate {}: {}", account, e)))
	}

	async fn stop_impersonating(&self, account: Address) -> Result<(), ClientError> {
		self.provider
			.anvil_stop_impersonating_account(account)
			.await
			.map_err(|e| ClientError::Node(format!("stop impersonating {}: {}", account, e)))
	}

	async fn send_native(&self, to: Address, amount: U256) -> Result<(), ClientError> {
		let request = TransactionRequest::default()
			.with_from(self.admin)
			.with_to(to)
			.with_value(amount);

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| ClientError::Transaction(format!("native transfer: {}", e)))?;
		confirm(pending, "native transfer").await
	}

	async fn snapshot(&self) -> Result<U256, ClientError> {
		self.provider
			.anvil_snapshot()
			.await
			.map_err(|e| ClientError::Node(format!("snapshot: {}", e)))
	}

	async fn revert_to(&self, id: U256) -> Result<bool, ClientError> {
		self.provider
			.anvil_revert(id)
			.await
			.map_err(|e| ClientError::Node(format!("revert: {}", e)))
	}
}

/// Addresses of the contracts deployed for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
	pub harness: Address,
	pub adapter: Address,
}

pub struct AlloyContractFactory {
	provider: DynProvider,
	unsigned: DynProvider,
	deployment: Deployment,
	curve_factory: Address,
	sender: Address,
	gas_limit: Option<u64>,
	control: Arc<AnvilControl>,
}

impl AlloyContractFactory {
	pub fn new(
		provider: DynProvider,
		unsigned: DynProvider,
		deployment: Deployment,
		curve_factory: Address,
		admin: Address,
		sender: Address,
	) -> Self {
		Self {
			control: Arc::new(AnvilControl::new(provider.clone(), admin)),
			provider,
			unsigned,
			deployment,
			curve_factory,
			sender,
			gas_limit: None,
		}
	}

	pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
		self.gas_limit = gas_limit;
		self
	}
}

impl ContractFactory for AlloyContractFactory {
	fn token(&self, address: Address) -> Arc<dyn TokenClient> {
		Arc::new(AlloyToken {
			address,
			provider: self.provider.clone(),
			unsigned: self.unsigned.clone(),
		})
	}

	fn crypto_pool(&self, address: Address) -> Arc<dyn CryptoPoolClient> {
		Arc::new(AlloyCryptoPool {
			contract: ICurveCryptoPool::new(address, self.provider.clone()),
		})
	}

	fn pool_factory(&self) -> Arc<dyn PoolFactoryClient> {
		Arc::new(AlloyPoolFactory {
			contract: ICurveFactory::new(self.curve_factory, self.provider.clone()),
		})
	}

	fn adapter(&self) -> Arc<dyn AdapterClient> {
		Arc::new(AlloyAdapter {
			contract: ICurveCryptoPoolAdapter::new(self.deployment.adapter, self.provider.clone()),
		})
	}

	fn harness(&self) -> Arc<dyn HarnessClient> {
		Arc::new(AlloyHarness {
			contract: ITestDeFiAdapter::new(self.deployment.harness, self.provider.clone()),
			sender: self.sender,
			gas_limit: self.gas_limit,
		})
	}

	fn chain(&self) -> Arc<dyn ChainControl> {
		self.control.clone()
	}
}
