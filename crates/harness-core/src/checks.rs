// harness-core/src/checks.rs

use crate::error::ScenarioError;
use harness_types::U256;

/// Fails unless `actual == expected`.
pub fn expect_eq(check: &'static str, actual: U256, expected: U256) -> Result<(), ScenarioError> {
	if actual == expected {
		Ok(())
	} else {
		Err(ScenarioError::Assertion {
			check,
			expected: expected.to_string(),
			actual: actual.to_string(),
		})
	}
}

/// Fails unless `actual >= reference * percent / 100`.
pub fn expect_at_least_percent(
	check: &'static str,
	actual: U256,
	reference: U256,
	percent: u64,
) -> Result<(), ScenarioError> {
	let floor = reference * U256::from(percent) / U256::from(100u64);
	if actual >= floor {
		Ok(())
	} else {
		Err(ScenarioError::Assertion {
			check,
			expected: format!(">= {}", floor),
			actual: actual.to_string(),
		})
	}
}
