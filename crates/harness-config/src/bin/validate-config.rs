//! Configuration validation utility
//!
//! Usage: cargo run --bin validate-config config/harness.toml

use std::env;
use std::process;

use harness_config::ConfigLoader;

#[tokio::main]
async fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 2 {
		eprintln!("Usage: {} <config-file>", args[0]);
		process::exit(1);
	}

	let config_path = &args[1];

	println!("Validating configuration file: {}", config_path);

	match ConfigLoader::new().with_file(config_path).load().await {
		Ok(config) => {
			let local = config.local_network();
			println!("✅ Configuration is valid!");
			println!("Network profile: {}", config.harness.network);
			println!("Chain ID: {}", local.chain_id);
			match &local.forking {
				Some(fork) => println!(
					"Forking: {} at {}",
					fork.url,
					fork.block_number
						.map(|b| b.to_string())
						.unwrap_or_else(|| "latest".to_string())
				),
				None => println!("Forking: disabled"),
			}
			println!("Compiler: solc {}", config.compiler.version);
			println!("Artifacts: {}", config.paths.artifacts.display());
			println!("Pools: {}", config.runner.pools_file.display());
		}
		Err(e) => {
			eprintln!("❌ Configuration validation failed:");
			eprintln!("{}", e);
			process::exit(1);
		}
	}
}
