//! Behaviour verification for the Curve crypto pool adapter.
//!
//! The verifier only talks to contracts through the capability traits in
//! `harness-types`, so the same scenario runs against a forked node or an
//! in-memory mock.

pub mod checks;
pub mod error;
pub mod funding;
pub mod runner;
pub mod scenario;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{FundingError, ScenarioError};
pub use funding::{fund_harness, FundingPlan};
pub use runner::{run_all, RunnerOptions};
pub use scenario::Verifier;
