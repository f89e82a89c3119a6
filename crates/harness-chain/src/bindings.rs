//! Contract bindings.
//!
//! Only the functions the harness calls are declared.

use alloy::sol;

sol! {
	#[sol(rpc)]
	interface IERC20 {
		function decimals() external view returns (uint8);
		function totalSupply() external view returns (uint256);
		function balanceOf(address account) external view returns (uint256);
		function transfer(address to, uint256 amount) external returns (bool);
	}

	#[sol(rpc)]
	interface ICurveCryptoPool {
		function get_virtual_price() external view returns (uint256);
		function calc_token_amount(uint256[2] amounts) external view returns (uint256);
		function calc_withdraw_one_coin(uint256 token_amount, uint256 i) external view returns (uint256);
		function coins(uint256 i) external view returns (address);
	}

	#[sol(rpc)]
	interface ICurveFactory {
		function get_coins(address pool) external view returns (address[2]);
	}

	#[sol(rpc)]
	interface ICurveCryptoPoolAdapter {
		function getLiquidityPoolTokenBalance(address vault, address underlyingToken, address liquidityPool) external view returns (uint256);
		function getUnderlyingTokens(address liquidityPool, address liquidityPoolToken) external view returns (address[] memory);
		function getAllAmountInToken(address vault, address underlyingToken, address liquidityPool) external view returns (uint256);
	}

	#[sol(rpc)]
	interface ITestDeFiAdapter {
		function giveAllowances(address[] calldata tokens, address[] calldata spenders) external;
		function testGetDepositAllCodes(address underlyingToken, address liquidityPool, address adapter) external;
		function testGetWithdrawAllCodes(address underlyingToken, address liquidityPool, address adapter) external;
		function getERC20TokenBalance(address token, address account) external view returns (uint256);
	}
}
