//! Simulated-chain plumbing for the adapter harness.
//!
//! This crate owns everything that touches a node: spawning a forked anvil
//! instance, deriving the funded accounts, deploying compiled artifacts and
//! the alloy-backed implementations of the contract client traits.

use harness_types::ClientError;
use thiserror::Error;

pub mod accounts;
pub mod artifacts;
pub mod bindings;
pub mod clients;
pub mod deploy;
pub mod node;
pub mod storage;

pub use accounts::Roles;
pub use clients::{AlloyContractFactory, Deployment};
pub use deploy::{contract_factory, deploy_contracts};
pub use node::ForkedNode;

#[derive(Debug, Error)]
pub enum ChainError {
	#[error("Node error: {0}")]
	Node(String),

	#[error("Signer error: {0}")]
	Signer(String),

	#[error("Artifact error: {0}")]
	Artifact(String),

	#[error("Deployment error: {0}")]
	Deployment(String),

	#[error(transparent)]
	Client(#[from] ClientError),
}
