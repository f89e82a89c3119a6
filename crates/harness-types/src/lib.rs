//! Shared types for the Curve adapter harness.
//!
//! Holds the static data model (networks, pool descriptors, whales), the
//! capability traits through which the verifier talks to deployed contracts,
//! and the scenario outcome types reported by the runner.

pub mod clients;
pub mod network;
pub mod outcome;
pub mod pools;
pub mod whales;

pub use alloy::primitives::{Address, U256};
pub use clients::*;
pub use network::*;
pub use outcome::*;
pub use pools::*;
pub use whales::*;
