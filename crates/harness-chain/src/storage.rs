//! Direct writes into ERC-20 balance mappings.

use crate::bindings::IERC20;
use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::providers::{ext::AnvilApi, DynProvider, Provider};
use alloy::sol_types::SolValue;
use harness_types::{BalanceSlot, ClientError, MappingLayout};
use tracing::{debug, trace};

/// Storage slots probed before giving up.
pub const MAX_PROBE_SLOTS: u64 = 100;

/// Storage key of `balanceOf[holder]` for a mapping at `slot`.
pub fn balance_key(holder: Address, slot: BalanceSlot) -> B256 {
	let index = U256::from(slot.index);
	match slot.layout {
		MappingLayout::Solidity => keccak256((holder, index).abi_encode()),
		MappingLayout::Vyper => keccak256((index, holder).abi_encode()),
	}
}

/// Candidate slots in probe order.
pub fn candidate_slots(max: u64) -> impl Iterator<Item = BalanceSlot> {
	(0..max).flat_map(|index| {
		[MappingLayout::Solidity, MappingLayout::Vyper]
			.into_iter()
			.map(move |layout| BalanceSlot { index, layout })
	})
}

/// Writes `amount` at `slot` and checks `balanceOf` reflects it.
///
/// The previous value is restored when the slot turns out to be wrong.
pub async fn try_slot(
	provider: &DynProvider,
	token: Address,
	holder: Address,
	amount: U256,
	slot: BalanceSlot,
) -> Result<bool, ClientError> {
	let key = U256::from_be_bytes(balance_key(holder, slot).0);

	let original = provider
		.get_storage_at(token, key)
		.await
		.map_err(|e| ClientError::Node(format!("Failed to read storage: {}", e)))?;

	provider
		.anvil_set_storage_at(token, key, B256::from(amount))
		.await
		.map_err(|e| ClientError::Node(format!("Failed to write storage: {}", e)))?;

	let balance = IERC20::new(token, provider.clone())
		.balanceOf(holder)
		.call()
		.await
		.map_err(|e| ClientError::Call(format!("balanceOf failed: {}", e)));

	if matches!(balance, Ok(balance) if balance == amount) {
		return Ok(true);
	}

	trace!(%token, %slot, "Slot mismatch, restoring");
	provider
		.anvil_set_storage_at(token, key, B256::from(original))
		.await
		.map_err(|e| ClientError::Node(format!("Failed to restore storage: {}", e)))?;

	balance.map(|_| false)
}

/// Finds the balance mapping of `token` by probing and writes `amount`.
pub async fn set_token_balance(
	provider: &DynProvider,
	token: Address,
	holder: Address,
	amount: U256,
	known: Option<BalanceSlot>,
) -> Result<BalanceSlot, ClientError> {
	if let Some(slot) = known {
		if try_slot(provider, token, holder, amount, slot).await? {
			return Ok(slot);
		}
	}

	for slot in candidate_slots(MAX_PROBE_SLOTS) {
		if try_slot(provider, token, holder, amount, slot).await? {
			debug!(%token, %slot, "Found balance slot");
			return Ok(slot);
		}
	}

	Err(ClientError::SlotNotFound(token))
}
