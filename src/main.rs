//! FireHero - Entry Point
//!
//! Runs a live session in the terminal. The simulation ticks in real time on
//! a tokio runtime while a reader thread turns typed commands into player
//! actions.

use firehero::core::error::Result;
use firehero::core::types::CellId;
use firehero::core::GameConfig;
use firehero::economy::UpgradeId;
use firehero::feedback::TracingHaptics;
use firehero::persistence::{FileStorage, LoadOutcome};
use firehero::simulation::{DriverUpdate, PlayerAction, Simulation, SimulationEvent, TickDriver};
use firehero::store::Field;

use std::io::{self, BufRead};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Default save slot, next to the working directory
const DEFAULT_SAVE_PATH: &str = "FireHero_Save_v1.json";

/// A parsed line of input
enum Command {
    Action(PlayerAction),
    Help,
    Quit,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("firehero=info")),
        )
        .init();

    tracing::info!("FireHero starting...");

    let config = match std::env::var("FIREHERO_CONFIG") {
        Ok(path) => GameConfig::load_from_toml(&PathBuf::from(path))?,
        Err(_) => GameConfig::default(),
    };
    let save_path =
        std::env::var("FIREHERO_SAVE").unwrap_or_else(|_| DEFAULT_SAVE_PATH.to_string());

    let mut sim = Simulation::new(config, Box::new(FileStorage::new(&save_path)))
        .with_haptics(TracingHaptics);
    sim.subscribe(Field::MaxWater, |value| {
        println!("Tank capacity: {:?}", value);
    });

    match sim.start() {
        Some(LoadOutcome::Restored) => println!("Save loaded from {}", save_path),
        Some(LoadOutcome::Recovered) => println!("Save at {} was unreadable, starting fresh", save_path),
        _ => println!("New game, saving to {}", save_path),
    }

    println!("\n=== FIREHERO ===");
    print_help();
    print_status(&sim);

    let (driver, stop) = TickDriver::from_config(sim.config());
    let (tx, rx) = mpsc::unbounded_channel();

    // Blocking stdin lives on its own thread; the runtime stays single-threaded
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(line.trim()) {
                Some(Command::Action(action)) => {
                    if tx.send(action).is_err() {
                        return;
                    }
                }
                Some(Command::Help) => print_help(),
                Some(Command::Quit) => break,
                None if line.trim().is_empty() => {}
                None => println!("Unknown command. Type 'help' for the list."),
            }
        }
        stop.stop();
    });

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = rt.block_on(driver.run(&mut sim, rx, |sim, update| report_update(sim, update)));

    if let Err(e) = sim.save_now() {
        tracing::warn!("Final save failed: {}", e);
    }

    println!(
        "\nGoodbye! {} fires extinguished, {:.0} coins, {} ticks played.",
        sim.state().fires_extinguished,
        sim.state().resources.coins,
        report.ticks
    );
    Ok(())
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();
    let command = parts.next()?;
    let arg = parts.next();

    match command {
        "x" | "spray" => {
            let cell = arg?.parse::<u32>().ok()?;
            Some(Command::Action(PlayerAction::extinguish(CellId(cell))))
        }
        "r" | "refill" => Some(Command::Action(PlayerAction::ManualRefill)),
        "buy" => {
            let id = arg?.parse::<UpgradeId>().ok()?;
            Some(Command::Action(PlayerAction::BuyUpgrade(id)))
        }
        "rain" => Some(Command::Action(PlayerAction::ActivateAreaClear)),
        "help" | "h" => Some(Command::Help),
        "quit" | "q" => Some(Command::Quit),
        _ => None,
    }
}

fn print_help() {
    println!("Commands:");
    println!("  x <cell>        - Spray a cell (0-based index)");
    println!("  refill / r      - Top up the water tank");
    println!("  buy <upgrade>   - Buy an upgrade (pump, tank, station)");
    println!("  rain            - Call rain to clear every fire");
    println!("  quit / q        - Save and exit");
    println!();
}

fn report_update(sim: &Simulation, update: &DriverUpdate) {
    match update {
        DriverUpdate::Tick(events) => {
            for event in events {
                match event {
                    SimulationEvent::FireStarted { cell } => {
                        println!("Fire at cell {}!", cell.0);
                        print_grid(sim);
                    }
                    SimulationEvent::FireExtinguished { cell, reward, .. } => {
                        println!("Rain put out cell {} (+{:.0} coins)", cell.0, reward);
                    }
                    SimulationEvent::SaveFailed { reason } => {
                        println!("Autosave failed: {}", reason);
                    }
                    _ => {}
                }
            }
        }
        DriverUpdate::Action { result: Ok(events), .. } => {
            for event in events {
                println!("{}", describe(event));
            }
            print_status(sim);
        }
        DriverUpdate::Action { action, result: Err(e) } => {
            println!("{:?} failed: {}", action, e);
        }
    }
}

fn describe(event: &SimulationEvent) -> String {
    match event {
        SimulationEvent::CellDamaged { cell, remaining, .. } => {
            format!("Cell {} fire at {} hp", cell.0, remaining)
        }
        SimulationEvent::FireExtinguished { cell, reward, .. } => {
            format!("Cell {} saved! +{:.0} coins", cell.0, reward)
        }
        SimulationEvent::WaterRefilled { amount } => format!("Refilled {:.0} water", amount),
        SimulationEvent::UpgradePurchased { id, level, price } => {
            format!("Bought {} level {} for {} coins", id, level, price)
        }
        SimulationEvent::AreaClearStarted { resolves_in } => {
            format!("Rain incoming in {:.1}s", resolves_in.as_secs_f64())
        }
        SimulationEvent::AreaClearResolved { cleared } => format!("Rain cleared {} fires", cleared),
        SimulationEvent::Saved { .. } => "Game saved".to_string(),
        SimulationEvent::SaveFailed { reason } => format!("Save failed: {}", reason),
        SimulationEvent::FireStarted { cell } => format!("Fire at cell {}!", cell.0),
    }
}

fn print_status(sim: &Simulation) {
    let state = sim.state();
    let stats = sim.stats();
    println!(
        "Water {:.0}/{} | Coins {:.0} | Burned {}% | Power {} | Income {:.1}/s",
        state.resources.water,
        state.resources.max_water,
        state.resources.coins,
        state.burned_percent,
        stats.click_power,
        stats.passive_income,
    );
    for id in UpgradeId::ALL {
        match sim.price_of(id) {
            Ok(price) => println!(
                "  {:<8} level {:>2}  next {} coins",
                id.as_str(),
                state.upgrades.level(id),
                price
            ),
            Err(_) => continue,
        }
    }
}

fn print_grid(sim: &Simulation) {
    let grid = sim.grid();
    let width = (grid.len() as f64).sqrt().ceil().max(1.0) as usize;
    for (id, cell) in grid.iter() {
        let glyph = if cell.is_burning() { '#' } else { '.' };
        print!("{}", glyph);
        if (id.0 as usize + 1) % width == 0 {
            println!();
        }
    }
    println!();
}
