//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "curve-adapter-harness")]
#[command(about = "Fork-based behaviour tests for the Curve crypto pool adapter", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "HARNESS_CONFIG", default_value = "config/harness.toml")]
	pub config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long, env = "HARNESS_LOG_LEVEL")]
	pub log_level: Option<String>,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
	/// Run every pool scenario against a forked node
	Run {
		/// Only run the pool registered under this name
		#[arg(long)]
		only: Option<String>,

		/// Write the run summary as JSON to this file
		#[arg(long)]
		report: Option<PathBuf>,
	},

	/// Validate the configuration file
	Validate,

	/// Print the known network profiles
	Networks,
}

impl Default for Command {
	fn default() -> Self {
		Command::Run {
			only: None,
			report: None,
		}
	}
}
