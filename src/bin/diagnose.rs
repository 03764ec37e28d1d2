//! Diagnostic tool - Check router settings and the scenario file
//!
//! Run with: cargo run --bin diagnose

use std::env;

use swap_router::scenario::Scenario;
use swap_router::RouterConfig;

fn main() {
    println!("🔍 SWAP ROUTER DIAGNOSTIC CHECK\n");

    // Load .env
    dotenvy::dotenv().ok();

    println!("═══════════════════════════════════════════════════");
    println!("                  CONFIGURATION                     ");
    println!("═══════════════════════════════════════════════════\n");

    let checks = [
        ("PROBE_UNITS", "100", "Whole units sampled per pair"),
        ("MAX_ASSETS", "64", "Largest registry a graph build accepts"),
        ("ABSENT_VENUE_POLICY", "reject", "Hop without a venue: reject or truncate"),
        ("EXECUTOR_ADDRESS", "0x…0e7ec0", "Account holding funds between hops"),
        ("SWAP_LOG", "false", "Append completed swaps to a file?"),
        ("SCENARIO_PATH", "./scenarios/triangle.toml", "World the CLI routes against"),
    ];

    for (key, default, desc) in checks {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let marker = if env::var(key).is_err() { "(default)" } else { "(from .env)" };
        println!("  {}: {} {}", key, value, marker);
        println!("    └─ {}\n", desc);
    }

    println!("═══════════════════════════════════════════════════");
    println!("                     STATUS                         ");
    println!("═══════════════════════════════════════════════════\n");

    let config = match RouterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("  ❌ Configuration does not parse: {}", e);
            return;
        }
    };

    match config.validate() {
        Ok(()) => println!("  ✅ Configuration valid"),
        Err(e) => println!("  ❌ Configuration invalid: {}", e),
    }

    match Scenario::load(&config.scenario_path).and_then(|s| s.build()) {
        Ok((registry, _)) => {
            println!(
                "  ✅ Scenario {}: {} assets, {} venues",
                config.scenario_path,
                registry.asset_count(),
                registry.venues().len()
            );
            if registry.asset_count() > config.max_assets {
                println!(
                    "\n  ⚠️  Scenario holds more assets than MAX_ASSETS = {};",
                    config.max_assets
                );
                println!("     graph builds will be refused.");
            }
        }
        Err(e) => println!("  ❌ Scenario {}: {}", config.scenario_path, e),
    }

    println!("\n✅ Diagnostic complete!\n");
}
