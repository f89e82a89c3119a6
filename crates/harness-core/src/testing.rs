//! In-memory stand-in for the forked chain and the contracts under test.
//!
//! Models a single two-coin crypto pool priced by its virtual price, an
//! adapter that deposits the harness' whole balance (capped at the pool
//! value) and withdraws all LP, plus the node cheats the funding path uses.

use async_trait::async_trait;
use harness_types::{
	Address, AdapterClient, BalanceSlot, ChainControl, ClientError, ContractFactory,
	CryptoPoolClient, HarnessClient, MappingLayout, PoolDescriptor, PoolFactoryClient,
	TokenClient, U256,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HARNESS: Address = Address::with_last_byte(0x11);
pub const ADAPTER: Address = Address::with_last_byte(0x12);
pub const POOL: Address = Address::with_last_byte(0x21);
pub const LP_TOKEN: Address = Address::with_last_byte(0x22);
pub const TOKEN: Address = Address::with_last_byte(0x31);
pub const OTHER_COIN: Address = Address::with_last_byte(0x32);
pub const WHALE: Address = Address::with_last_byte(0x41);

fn e18() -> U256 {
	U256::from(10u64).pow(U256::from(18u64))
}

pub fn pool_descriptor() -> PoolDescriptor {
	PoolDescriptor {
		pool: POOL,
		lp_token: LP_TOKEN,
		tokens: vec![TOKEN],
	}
}

#[derive(Clone, Default)]
struct Ledger {
	balances: HashMap<(Address, Address), U256>,
	supplies: HashMap<Address, U256>,
	native: HashMap<Address, U256>,
	allowances: HashSet<(Address, Address)>,
	impersonating: HashSet<Address>,
}

impl Ledger {
	fn balance(&self, token: Address, holder: Address) -> U256 {
		self.balances
			.get(&(token, holder))
			.copied()
			.unwrap_or_default()
	}

	fn set_balance(&mut self, token: Address, holder: Address, amount: U256) {
		self.balances.insert((token, holder), amount);
	}
}

struct MockState {
	ledger: Ledger,
	snapshots: Vec<Ledger>,
	virtual_price: U256,
	coins: Vec<Address>,
	storage_writable: bool,
	lp_misreport: U256,
	/// LP left behind by a withdraw that the adapter leaves out of its report
	unreported_lp: U256,
	withdraw_lp_residual: U256,
	amount_in_token_misreport: U256,
	underlying_misreport: U256,
	underlying_misreport_after_withdraw: bool,
	withdrawn: bool,
	adapter_underlying: Option<Vec<Address>>,
	native_sends_fail: bool,
	deposit_fee_percent: u64,
	deposit_delay: Option<Duration>,
	calls: Vec<&'static str>,
}

/// Shared handle; every client handed out by the factory sees the same state.
#[derive(Clone)]
pub struct MockProtocol {
	state: Arc<Mutex<MockState>>,
}

impl MockProtocol {
	/// Virtual price 2.0 and 1000 LP outstanding, so the pool is worth 2000 tokens.
	pub fn new() -> Self {
		let mut ledger = Ledger::default();
		ledger.supplies.insert(LP_TOKEN, U256::from(1_000u64) * e18());

		Self {
			state: Arc::new(Mutex::new(MockState {
				ledger,
				snapshots: Vec::new(),
				virtual_price: U256::from(2u64) * e18(),
				coins: vec![OTHER_COIN, TOKEN],
				storage_writable: true,
				lp_misreport: U256::ZERO,
				unreported_lp: U256::ZERO,
				withdraw_lp_residual: U256::ZERO,
				amount_in_token_misreport: U256::ZERO,
				underlying_misreport: U256::ZERO,
				underlying_misreport_after_withdraw: false,
				withdrawn: false,
				adapter_underlying: None,
				native_sends_fail: false,
				deposit_fee_percent: 0,
				deposit_delay: None,
				calls: Vec::new(),
			})),
		}
	}

	fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
		let mut state = self.state.lock().unwrap();
		f(&mut state)
	}

	fn record(&self, call: &'static str) {
		self.with(|s| s.calls.push(call));
	}

	pub fn called(&self, call: &str) -> bool {
		self.with(|s| s.calls.iter().any(|c| *c == call))
	}

	pub fn balance(&self, token: Address, holder: Address) -> U256 {
		self.with(|s| s.ledger.balance(token, holder))
	}

	pub fn set_balance(&self, token: Address, holder: Address, amount: U256) {
		self.with(|s| s.ledger.set_balance(token, holder, amount));
	}

	pub fn set_total_supply(&self, supply: U256) {
		self.with(|s| s.ledger.supplies.insert(LP_TOKEN, supply));
	}

	pub fn set_virtual_price(&self, price: U256) {
		self.with(|s| s.virtual_price = price);
	}

	pub fn set_coins(&self, coins: Vec<Address>) {
		self.with(|s| s.coins = coins);
	}

	pub fn disable_storage_writes(&self) {
		self.with(|s| s.storage_writable = false);
	}

	/// Added to every LP balance the adapter reports.
	pub fn set_lp_misreport(&self, extra: U256) {
		self.with(|s| s.lp_misreport = extra);
	}

	/// Withdraws leave `residual` LP with the harness without the adapter reporting it.
	pub fn set_withdraw_lp_residual(&self, residual: U256) {
		self.with(|s| s.withdraw_lp_residual = residual);
	}

	/// Added to the adapter's valuation of the harness position.
	pub fn set_amount_in_token_misreport(&self, extra: U256) {
		self.with(|s| s.amount_in_token_misreport = extra);
	}

	/// Added to token balances the harness contract reports, optionally only
	/// once a withdraw has happened.
	pub fn set_underlying_misreport(&self, extra: U256, after_withdraw: bool) {
		self.with(|s| {
			s.underlying_misreport = extra;
			s.underlying_misreport_after_withdraw = after_withdraw;
		});
	}

	/// Replaces the adapter's underlying token list.
	pub fn set_adapter_underlying(&self, tokens: Vec<Address>) {
		self.with(|s| s.adapter_underlying = Some(tokens));
	}

	pub fn fail_native_sends(&self) {
		self.with(|s| s.native_sends_fail = true);
	}

	/// Share of each deposit the pool keeps without minting LP for it.
	pub fn set_deposit_fee_percent(&self, percent: u64) {
		self.with(|s| s.deposit_fee_percent = percent);
	}

	pub fn set_deposit_delay(&self, delay: Duration) {
		self.with(|s| s.deposit_delay = Some(delay));
	}

	pub fn is_impersonating(&self, account: Address) -> bool {
		self.with(|s| s.ledger.impersonating.contains(&account))
	}

	pub fn native_balance(&self, account: Address) -> U256 {
		self.with(|s| s.ledger.native.get(&account).copied().unwrap_or_default())
	}
}

impl MockState {
	fn lp_for(&self, amount: U256) -> U256 {
		amount * e18() / self.virtual_price
	}

	fn value_of(&self, lp: U256) -> U256 {
		lp * self.virtual_price / e18()
	}

	fn require_allowance(&self, token: Address, spender: Address) -> Result<(), ClientError> {
		if self.ledger.allowances.contains(&(token, spender)) {
			Ok(())
		} else {
			Err(ClientError::Reverted("ERC20: insufficient allowance".into()))
		}
	}
}

struct MockToken {
	protocol: MockProtocol,
	address: Address,
}

#[async_trait]
impl TokenClient for MockToken {
	fn address(&self) -> Address {
		self.address
	}

	async fn decimals(&self) -> Result<u8, ClientError> {
		Ok(18)
	}

	async fn balance_of(&self, holder: Address) -> Result<U256, ClientError> {
		Ok(self.protocol.balance(self.address, holder))
	}

	async fn total_supply(&self) -> Result<U256, ClientError> {
		Ok(self.protocol.with(|s| {
			s.ledger
				.supplies
				.get(&self.address)
				.copied()
				.unwrap_or_default()
		}))
	}

	async fn transfer_as(
		&self,
		holder: Address,
		to: Address,
		amount: U256,
	) -> Result<(), ClientError> {
		self.protocol.record("transfer_as");
		self.protocol.with(|s| {
			if !s.ledger.impersonating.contains(&holder) {
				return Err(ClientError::Transaction(format!("{} is not impersonated", holder)));
			}
			let from_balance = s.ledger.balance(self.address, holder);
			if from_balance < amount {
				return Err(ClientError::Reverted(
					"ERC20: transfer amount exceeds balance".into(),
				));
			}
			let to_balance = s.ledger.balance(self.address, to);
			s.ledger.set_balance(self.address, holder, from_balance - amount);
			s.ledger.set_balance(self.address, to, to_balance + amount);
			Ok(())
		})
	}
}

struct MockPool(MockProtocol);

#[async_trait]
impl CryptoPoolClient for MockPool {
	fn address(&self) -> Address {
		POOL
	}

	async fn virtual_price(&self) -> Result<U256, ClientError> {
		Ok(self.0.with(|s| s.virtual_price))
	}

	async fn calc_token_amount(&self, amounts: [U256; 2]) -> Result<U256, ClientError> {
		Ok(self.0.with(|s| s.lp_for(amounts[0] + amounts[1])))
	}

	async fn calc_withdraw_one_coin(
		&self,
		lp_amount: U256,
		_index: usize,
	) -> Result<U256, ClientError> {
		Ok(self.0.with(|s| s.value_of(lp_amount)))
	}
}

struct MockCurveFactory(MockProtocol);

#[async_trait]
impl PoolFactoryClient for MockCurveFactory {
	async fn coins(&self, _pool: Address) -> Result<Vec<Address>, ClientError> {
		Ok(self.0.with(|s| s.coins.clone()))
	}
}

struct MockAdapter(MockProtocol);

#[async_trait]
impl AdapterClient for MockAdapter {
	fn address(&self) -> Address {
		ADAPTER
	}

	async fn liquidity_pool_token_balance(
		&self,
		vault: Address,
		_underlying_token: Address,
		_pool: Address,
	) -> Result<U256, ClientError> {
		Ok(self.0.with(|s| {
			s.ledger
				.balance(LP_TOKEN, vault)
				.saturating_sub(s.unreported_lp)
				+ s.lp_misreport
		}))
	}

	async fn underlying_tokens(
		&self,
		_pool: Address,
		_lp_token: Address,
	) -> Result<Vec<Address>, ClientError> {
		Ok(self
			.0
			.with(|s| s.adapter_underlying.clone().unwrap_or_else(|| s.coins.clone())))
	}

	async fn all_amount_in_token(
		&self,
		vault: Address,
		_underlying_token: Address,
		_pool: Address,
	) -> Result<U256, ClientError> {
		Ok(self.0.with(|s| {
			s.value_of(s.ledger.balance(LP_TOKEN, vault)) + s.amount_in_token_misreport
		}))
	}
}

struct MockHarness(MockProtocol);

#[async_trait]
impl HarnessClient for MockHarness {
	fn address(&self) -> Address {
		HARNESS
	}

	async fn give_allowances(
		&self,
		tokens: Vec<Address>,
		spenders: Vec<Address>,
	) -> Result<(), ClientError> {
		self.0.record("give_allowances");
		self.0.with(|s| {
			s.ledger
				.allowances
				.extend(tokens.into_iter().zip(spenders));
		});
		Ok(())
	}

	async fn deposit_all(
		&self,
		underlying_token: Address,
		pool: Address,
		_adapter: Address,
	) -> Result<(), ClientError> {
		self.0.record("deposit_all");
		if let Some(delay) = self.0.with(|s| s.deposit_delay) {
			tokio::time::sleep(delay).await;
		}
		self.0.with(|s| {
			s.require_allowance(underlying_token, pool)?;

			let supply = s.ledger.supplies.get(&LP_TOKEN).copied().unwrap_or_default();
			let balance = s.ledger.balance(underlying_token, HARNESS);
			let amount = balance.min(s.value_of(supply));
			let minted =
				s.lp_for(amount) * U256::from(100 - s.deposit_fee_percent) / U256::from(100u64);

			let lp = s.ledger.balance(LP_TOKEN, HARNESS);
			s.ledger.set_balance(underlying_token, HARNESS, balance - amount);
			s.ledger.set_balance(LP_TOKEN, HARNESS, lp + minted);
			s.ledger.supplies.insert(LP_TOKEN, supply + minted);
			Ok(())
		})
	}

	async fn withdraw_all(
		&self,
		underlying_token: Address,
		pool: Address,
		_adapter: Address,
	) -> Result<(), ClientError> {
		self.0.record("withdraw_all");
		self.0.with(|s| {
			s.require_allowance(LP_TOKEN, pool)?;

			let held = s.ledger.balance(LP_TOKEN, HARNESS);
			let residual = s.withdraw_lp_residual.min(held);
			let lp = held - residual;
			let supply = s.ledger.supplies.get(&LP_TOKEN).copied().unwrap_or_default();
			let balance = s.ledger.balance(underlying_token, HARNESS);
			s.ledger.set_balance(LP_TOKEN, HARNESS, residual);
			s.ledger.supplies.insert(LP_TOKEN, supply.saturating_sub(lp));
			s.ledger
				.set_balance(underlying_token, HARNESS, balance + s.value_of(lp));
			s.unreported_lp = residual;
			s.withdrawn = true;
			Ok(())
		})
	}

	async fn token_balance(&self, token: Address, account: Address) -> Result<U256, ClientError> {
		Ok(self.0.with(|s| {
			let balance = s.ledger.balance(token, account);
			if s.underlying_misreport_after_withdraw && !s.withdrawn {
				balance
			} else {
				balance + s.underlying_misreport
			}
		}))
	}
}

struct MockChain(MockProtocol);

#[async_trait]
impl ChainControl for MockChain {
	async fn set_token_balance(
		&self,
		token: Address,
		holder: Address,
		amount: U256,
	) -> Result<BalanceSlot, ClientError> {
		self.0.record("set_token_balance");
		self.0.with(|s| {
			if !s.storage_writable {
				return Err(ClientError::SlotNotFound(token));
			}
			s.ledger.set_balance(token, holder, amount);
			Ok(BalanceSlot {
				index: 0,
				layout: MappingLayout::Solidity,
			})
		})
	}

	async fn impersonate(&self, account: Address) -> Result<(), ClientError> {
		self.0.record("impersonate");
		self.0.with(|s| s.ledger.impersonating.insert(account));
		Ok(())
	}

	async fn stop_impersonating(&self, account: Address) -> Result<(), ClientError> {
		self.0.record("stop_impersonating");
		self.0.with(|s| s.ledger.impersonating.remove(&account));
		Ok(())
	}

	async fn send_native(&self, to: Address, amount: U256) -> Result<(), ClientError> {
		self.0.record("send_native");
		self.0.with(|s| {
			if s.native_sends_fail {
				return Err(ClientError::Transaction("native transfer: insufficient funds".into()));
			}
			let balance = s.ledger.native.entry(to).or_default();
			*balance += amount;
			Ok(())
		})
	}

	async fn snapshot(&self) -> Result<U256, ClientError> {
		self.0.record("snapshot");
		Ok(self.0.with(|s| {
			s.snapshots.push(s.ledger.clone());
			U256::from(s.snapshots.len() - 1)
		}))
	}

	async fn revert_to(&self, id: U256) -> Result<bool, ClientError> {
		self.0.record("revert_to");
		let id = usize::try_from(id).map_err(|e| ClientError::Node(e.to_string()))?;
		Ok(self.0.with(|s| {
			if id >= s.snapshots.len() {
				return false;
			}
			s.ledger = s.snapshots[id].clone();
			s.snapshots.truncate(id);
			true
		}))
	}
}

impl ContractFactory for MockProtocol {
	fn token(&self, address: Address) -> Arc<dyn TokenClient> {
		Arc::new(MockToken {
			protocol: self.clone(),
			address,
		})
	}

	fn crypto_pool(&self, _address: Address) -> Arc<dyn CryptoPoolClient> {
		Arc::new(MockPool(self.clone()))
	}

	fn pool_factory(&self) -> Arc<dyn PoolFactoryClient> {
		Arc::new(MockCurveFactory(self.clone()))
	}

	fn adapter(&self) -> Arc<dyn AdapterClient> {
		Arc::new(MockAdapter(self.clone()))
	}

	fn harness(&self) -> Arc<dyn HarnessClient> {
		Arc::new(MockHarness(self.clone()))
	}

	fn chain(&self) -> Arc<dyn ChainControl> {
		Arc::new(MockChain(self.clone()))
	}
}
