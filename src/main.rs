//! Swap Router - CLI over an in-memory scenario
//!
//! Run with: cargo run -- route WETH DAI 1
//!
//! Loads the configuration (env / .env or `--config`), builds the registry
//! and ledger from the scenario file, and runs one command against them.

use alloy_primitives::{Address, U256};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use console::style;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swap_router::registry::{format_units, whole_units};
use swap_router::scenario::Scenario;
use swap_router::{AssetLedger, InMemoryLedger, Registry, Router, RouterConfig};

#[derive(Parser, Debug)]
#[command(name = "swap-router", version, about = "Best-route swaps across venues")]
struct Cli {
    /// TOML config file (default: environment / .env)
    #[arg(long)]
    config: Option<String>,

    /// Scenario file (overrides SCENARIO_PATH)
    #[arg(long)]
    scenario: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the best-rate matrix and edge costs
    Graph,

    /// Best single venue for a pair
    Quote {
        from: String,
        to: String,
        /// Whole units of `from`
        amount: u64,
    },

    /// Best multi-hop route and its expected output
    Route {
        from: String,
        to: String,
        amount: u64,
    },

    /// Execute a swap from the scenario trader's balance
    Swap {
        from: String,
        to: String,
        amount: u64,

        /// Minimum output in whole units of `to`
        #[arg(long, default_value_t = 0)]
        min_out: u64,

        /// Pinned venues by name, one per hop ("-" for none)
        #[arg(long, value_delimiter = ',')]
        exchanges: Vec<String>,

        /// Intermediate assets of a pinned route
        #[arg(long, value_delimiter = ',')]
        via: Vec<String>,
    },
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🔀 SWAP ROUTER - Best Route Across Venues").cyan().bold()
    );
    println!(
        "{}",
        style("    Fixed-point log costs | Bellman-Ford | Atomic execution").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("swap_router=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    print_banner();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => RouterConfig::from_file(path)?,
        None => RouterConfig::from_env()?,
    };
    if let Some(scenario) = &cli.scenario {
        config.scenario_path = scenario.clone();
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file");
        return Err(e);
    }

    config.print_summary();
    println!();

    let scenario = Scenario::load(&config.scenario_path)?;
    let (registry, mut ledger) = scenario.build()?;
    let router = Router::new(config, registry);

    match cli.command {
        Command::Graph => print_graph(&router, &ledger)?,
        Command::Quote { from, to, amount } => {
            let asset_in = resolve_asset(router.registry(), &from)?;
            let asset_out = resolve_asset(router.registry(), &to)?;
            let amount_in = to_raw(&ledger, asset_in, amount)?;

            let quote = router.get_best_exchange(&ledger, asset_in, asset_out, amount_in)?;

            match quote.venue {
                Some(venue) => println!(
                    "{} {} {} -> {} {} on {}",
                    style("✓").green(),
                    amount,
                    from.to_uppercase(),
                    style(format_units(quote.amount_out, decimals(&ledger, asset_out))).bold(),
                    to.to_uppercase(),
                    style(router.registry().label(venue)).cyan()
                ),
                None => println!(
                    "{} No venue prices {} -> {}",
                    style("✗").red(),
                    from.to_uppercase(),
                    to.to_uppercase()
                ),
            }
        }
        Command::Route { from, to, amount } => {
            let asset_in = resolve_asset(router.registry(), &from)?;
            let asset_out = resolve_asset(router.registry(), &to)?;
            let amount_in = to_raw(&ledger, asset_in, amount)?;

            let start = Instant::now();
            let route = router.get_expected_out(&ledger, asset_in, asset_out, amount_in)?;

            println!(
                "{} Route found in {:?}: {}",
                style("✓").green(),
                start.elapsed(),
                style(route.path.describe(router.registry())).cyan()
            );
            println!(
                "   Expected out: {} {}",
                style(format_units(route.amount_out, decimals(&ledger, asset_out))).bold(),
                to.to_uppercase()
            );
            println!(
                "   Path cost:    {} bits (x{:.6} raw rate at probe size)",
                route.cost,
                route.cost.implied_rate()
            );
            if route.has_negative_cycle {
                println!(
                    "{}",
                    style("   ⚠ Quoted rates contain an arbitrage cycle").yellow()
                );
            }
        }
        Command::Swap {
            from,
            to,
            amount,
            min_out,
            exchanges,
            via,
        } => {
            let trader = scenario.trader;
            let asset_in = resolve_asset(router.registry(), &from)?;
            let asset_out = resolve_asset(router.registry(), &to)?;
            let amount_in = to_raw(&ledger, asset_in, amount)?;
            let min_amount_out = to_raw(&ledger, asset_out, min_out)?;

            ledger.approve(asset_in, trader, router.config().executor_address, amount_in)?;

            let report = if exchanges.is_empty() {
                router.swap_on_chain(&mut ledger, asset_in, asset_out, amount_in, min_amount_out, trader, trader)?
            } else {
                let mut tokens = vec![asset_in];
                for symbol in &via {
                    tokens.push(resolve_asset(router.registry(), symbol)?);
                }
                tokens.push(asset_out);

                let venues = exchanges
                    .iter()
                    .map(|name| resolve_venue(router.registry(), name))
                    .collect::<Result<Vec<_>>>()?;

                router.swap(&mut ledger, &tokens, &venues, amount_in, min_amount_out, trader, trader)?
            };

            let out_decimals = decimals(&ledger, report.asset_out);
            println!(
                "{} Swapped {} {} -> {} {} over {} hop(s){}",
                style("✓").green().bold(),
                amount,
                from.to_uppercase(),
                style(format_units(report.amount_out, out_decimals)).bold(),
                router.registry().label(report.asset_out),
                report.hops_executed,
                if report.truncated { " (truncated)" } else { "" }
            );

            println!();
            println!("{}", style("Trader balances:").blue());
            for asset in router.registry().assets() {
                println!(
                    "   {:<8} {}",
                    asset.symbol,
                    format_units(
                        ledger.balance_of(asset.address, trader),
                        decimals(&ledger, asset.address)
                    )
                );
            }
        }
    }

    Ok(())
}

fn print_graph(router: &Router, ledger: &InMemoryLedger) -> Result<()> {
    let start = Instant::now();
    let graph = router.build_graph(ledger)?;
    let registry = router.registry();

    println!(
        "{} Graph built in {:?}: {} nodes, {} edges",
        style("✓").green(),
        start.elapsed(),
        graph.asset_count(),
        graph.edge_count()
    );
    println!();

    for (i, &asset_in) in graph.assets().iter().enumerate() {
        let probe = graph.probe(i).unwrap_or(U256::ZERO);

        for (j, &asset_out) in graph.assets().iter().enumerate() {
            if i == j {
                continue;
            }
            let quote = graph.rate(i, j);
            let Some(venue) = graph.venue(i, j) else {
                println!(
                    "   {:>6} -> {:<6} {}",
                    registry.label(asset_in),
                    registry.label(asset_out),
                    style("no edge").dim()
                );
                continue;
            };

            println!(
                "   {:>6} -> {:<6} {} for {} on {:<4} cost {}",
                registry.label(asset_in),
                registry.label(asset_out),
                format_units(quote.amount_out, decimals(ledger, asset_out)),
                format_units(probe, decimals(ledger, asset_in)),
                registry.label(venue),
                graph.cost(i, j)
            );
        }
    }

    Ok(())
}

fn resolve_asset(registry: &Registry, symbol: &str) -> Result<Address> {
    registry
        .asset_by_symbol(symbol)
        .map(|a| a.address)
        .ok_or_else(|| eyre!("Unknown asset symbol '{}'", symbol))
}

fn resolve_venue(registry: &Registry, name: &str) -> Result<Address> {
    if name == "-" {
        return Ok(Address::ZERO);
    }
    registry
        .venues()
        .iter()
        .find(|v| v.name().eq_ignore_ascii_case(name))
        .map(|v| v.address())
        .ok_or_else(|| eyre!("Unknown venue '{}'", name))
}

fn decimals(ledger: &InMemoryLedger, asset: Address) -> u8 {
    ledger.decimals(asset).unwrap_or(18)
}

fn to_raw(ledger: &InMemoryLedger, asset: Address, units: u64) -> Result<U256> {
    let decimals = ledger
        .decimals(asset)
        .ok_or_else(|| eyre!("Ledger has no decimals for {}", asset))?;
    whole_units(units, decimals)
        .ok_or_else(|| eyre!("{} units overflow at {} decimals", units, decimals))
}
