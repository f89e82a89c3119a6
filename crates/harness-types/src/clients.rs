//! Typed capability interfaces over deployed contracts.
//!
//! The verifier never holds raw contract handles. It asks a
//! [`ContractFactory`] for the capability it needs and gets back a trait
//! object that only exposes the calls that contract supports.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by contract clients.
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Contract call failed: {0}")]
	Call(String),

	#[error("Transaction failed: {0}")]
	Transaction(String),

	#[error("Transaction reverted: {0}")]
	Reverted(String),

	#[error("Node error: {0}")]
	Node(String),

	#[error("Balance slot not found for token {0}")]
	SlotNotFound(Address),
}

/// Storage layout of an ERC-20 `balanceOf` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingLayout {
	/// `keccak256(abi.encode(holder, slot))`
	Solidity,
	/// `keccak256(abi.encode(slot, holder))`
	Vyper,
}

/// Location of a token's balance mapping, found by probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSlot {
	pub index: u64,
	pub layout: MappingLayout,
}

impl fmt::Display for BalanceSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{:?}", self.index, self.layout)
	}
}

#[async_trait]
pub trait TokenClient: Send + Sync {
	fn address(&self) -> Address;

	async fn decimals(&self) -> Result<u8, ClientError>;

	async fn balance_of(&self, holder: Address) -> Result<U256, ClientError>;

	async fn total_supply(&self) -> Result<U256, ClientError>;

	/// Transfers `amount` from `holder`, which must be impersonated.
	async fn transfer_as(
		&self,
		holder: Address,
		to: Address,
		amount: U256,
	) -> Result<(), ClientError>;
}

/// Two-coin Curve crypto pool.
#[async_trait]
pub trait CryptoPoolClient: Send + Sync {
	fn address(&self) -> Address;

	async fn virtual_price(&self) -> Result<U256, ClientError>;

	async fn calc_token_amount(&self, amounts: [U256; 2]) -> Result<U256, ClientError>;

	async fn calc_withdraw_one_coin(
		&self,
		lp_amount: U256,
		index: usize,
	) -> Result<U256, ClientError>;
}

/// Curve pool factory used to resolve a pool's coins.
#[async_trait]
pub trait PoolFactoryClient: Send + Sync {
	async fn coins(&self, pool: Address) -> Result<Vec<Address>, ClientError>;
}

/// The adapter under test.
#[async_trait]
pub trait AdapterClient: Send + Sync {
	fn address(&self) -> Address;

	async fn liquidity_pool_token_balance(
		&self,
		vault: Address,
		underlying_token: Address,
		pool: Address,
	) -> Result<U256, ClientError>;

	async fn underlying_tokens(
		&self,
		pool: Address,
		lp_token: Address,
	) -> Result<Vec<Address>, ClientError>;

	async fn all_amount_in_token(
		&self,
		vault: Address,
		underlying_token: Address,
		pool: Address,
	) -> Result<U256, ClientError>;
}

/// Test-only contract holding balances and routing calls to the adapter.
#[async_trait]
pub trait HarnessClient: Send + Sync {
	fn address(&self) -> Address;

	async fn give_allowances(
		&self,
		tokens: Vec<Address>,
		spenders: Vec<Address>,
	) -> Result<(), ClientError>;

	async fn deposit_all(
		&self,
		underlying_token: Address,
		pool: Address,
		adapter: Address,
	) -> Result<(), ClientError>;

	async fn withdraw_all(
		&self,
		underlying_token: Address,
		pool: Address,
		adapter: Address,
	) -> Result<(), ClientError>;

	async fn token_balance(&self, token: Address, account: Address) -> Result<U256, ClientError>;
}

/// Cheat operations only a simulated node supports.
#[async_trait]
pub trait ChainControl: Send + Sync {
	/// Writes `amount` straight into the token's balance mapping.
	async fn set_token_balance(
		&self,
		token: Address,
		holder: Address,
		amount: U256,
	) -> Result<BalanceSlot, ClientError>;

	async fn impersonate(&self, account: Address) -> Result<(), ClientError>;

	async fn stop_impersonating(&self, account: Address) -> Result<(), ClientError>;

	/// Sends native currency from the admin account.
	async fn send_native(&self, to: Address, amount: U256) -> Result<(), ClientError>;

	async fn snapshot(&self) -> Result<U256, ClientError>;

	async fn revert_to(&self, id: U256) -> Result<bool, ClientError>;
}

/// Hands out typed clients for one deployed harness/adapter pair.
pub trait ContractFactory: Send + Sync {
	fn token(&self, address: Address) -> Arc<dyn TokenClient>;

	fn crypto_pool(&self, address: Address) -> Arc<dyn CryptoPoolClient>;

	fn pool_factory(&self) -> Arc<dyn PoolFactoryClient>;

	fn adapter(&self) -> Arc<dyn AdapterClient>;

	fn harness(&self) -> Arc<dyn HarnessClient>;

	fn chain(&self) -> Arc<dyn ChainControl>;
}
