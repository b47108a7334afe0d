//! Headless Autoplay Runner
//!
//! Plays a session with a greedy bot at a fixed tick step and prints a
//! summary. Useful for balancing prices and spread rates.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use firehero::core::GameConfig;
use firehero::economy::UpgradeId;
use firehero::persistence::{FileStorage, MemoryStorage, SnapshotStorage};
use firehero::simulation::{PlayerAction, Simulation, SimulationEvent};
use serde::Serialize;

/// Headless Autoplay Runner - greedy bot for balance testing
#[derive(Parser, Debug)]
#[command(name = "autoplay")]
#[command(about = "Play FireHero with a greedy bot and report the outcome")]
struct Args {
    /// Simulated seconds to play
    #[arg(long, default_value_t = 600)]
    seconds: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// TOML config overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save file to load and write back; in-memory when omitted
    #[arg(long)]
    save: Option<PathBuf>,

    /// Taps the bot may make per second
    #[arg(long, default_value_t = 6)]
    taps_per_second: u32,

    /// Burned percentage at which the bot calls rain
    #[arg(long, default_value_t = 30)]
    rain_at: u8,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct AutoplayResult {
    seed: u64,
    seconds: u64,
    ticks: u64,
    coins: f64,
    water: f64,
    max_water: u32,
    fires_started: u64,
    fires_extinguished: u64,
    peak_burned_percent: u8,
    final_burned_percent: u8,
    rains: u64,
    upgrades: BTreeMap<String, u32>,
    rejected_actions: u64,
}

#[derive(Default)]
struct Tally {
    fires_started: u64,
    peak_burned: u8,
    rains: u64,
    rejected: u64,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("firehero=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => match GameConfig::load_from_toml(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    config.seed = Some(seed);

    let storage: Box<dyn SnapshotStorage> = match &args.save {
        Some(path) => Box::new(FileStorage::new(path)),
        None => Box::new(MemoryStorage::new()),
    };

    let mut sim = Simulation::new(config, storage);
    sim.start();

    let step = sim.config().tick_period();
    let total_ticks = args.seconds * 1000 / step.as_millis().max(1) as u64;
    let taps_per_tick = (args.taps_per_second as f64 * step.as_secs_f64()).max(0.0);
    let mut tap_budget = 0.0;
    let mut tally = Tally::default();

    for _ in 0..total_ticks {
        for event in sim.tick(step) {
            if let SimulationEvent::FireStarted { .. } = event {
                tally.fires_started += 1;
            }
        }
        tally.peak_burned = tally.peak_burned.max(sim.state().burned_percent);

        tap_budget += taps_per_tick;
        while tap_budget >= 1.0 {
            tap_budget -= 1.0;
            let Some(action) = choose_action(&sim, args.rain_at) else {
                break;
            };
            if action == PlayerAction::ActivateAreaClear {
                tally.rains += 1;
            }
            if sim.dispatch(action).is_err() {
                tally.rejected += 1;
            }
        }
    }

    if let Err(e) = sim.save_now() {
        tracing::warn!("Final save failed: {}", e);
    }

    let state = sim.state();
    let result = AutoplayResult {
        seed,
        seconds: args.seconds,
        ticks: sim.clock().ticks(),
        coins: state.resources.coins,
        water: state.resources.water,
        max_water: state.resources.max_water,
        fires_started: tally.fires_started,
        fires_extinguished: state.fires_extinguished,
        peak_burned_percent: tally.peak_burned,
        final_burned_percent: state.burned_percent,
        rains: tally.rains,
        upgrades: state
            .upgrades
            .iter()
            .map(|(id, level)| (id.as_str().to_string(), level))
            .collect(),
        rejected_actions: tally.rejected,
    };

    if args.format == "json" {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize result: {}", e),
        }
    } else {
        println!("=== AUTOPLAY RESULT ===");
        println!("Seed: {}", result.seed);
        println!("Played: {}s ({} ticks)", result.seconds, result.ticks);
        println!("Coins: {:.0}", result.coins);
        println!("Water: {:.0}/{}", result.water, result.max_water);
        println!(
            "Fires: {} started, {} extinguished, {} rains",
            result.fires_started, result.fires_extinguished, result.rains
        );
        println!(
            "Burned: peak {}%, final {}%",
            result.peak_burned_percent, result.final_burned_percent
        );
        for (id, level) in &result.upgrades {
            println!("  {}: level {}", id, level);
        }
    }
}

/// Greedy policy: rain when overrun, buy when affordable, otherwise spray
fn choose_action(sim: &Simulation, rain_at: u8) -> Option<PlayerAction> {
    let state = sim.state();
    let config = sim.config();
    let resources = state.resources;

    if state.burned_percent >= rain_at && resources.water >= config.area_clear_cost {
        return Some(PlayerAction::ActivateAreaClear);
    }

    let cheapest = UpgradeId::ALL
        .into_iter()
        .filter_map(|id| sim.price_of(id).ok().map(|price| (id, price)))
        .filter(|(id, _)| {
            config
                .upgrades
                .get(*id)
                .map_or(false, |def| !def.is_maxed(state.upgrades.level(*id)))
        })
        .min_by_key(|(_, price)| *price);
    if let Some((id, price)) = cheapest {
        if resources.coins >= price as f64 {
            return Some(PlayerAction::BuyUpgrade(id));
        }
    }

    if resources.water < config.extinguish_cost {
        return None;
    }
    // Focus the weakest fire so taps finish cells
    sim.grid()
        .iter()
        .filter(|(_, cell)| cell.is_burning())
        .min_by_key(|(_, cell)| cell.fire_hp())
        .map(|(id, _)| PlayerAction::extinguish(id))
}
