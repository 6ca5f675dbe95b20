#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Worms scenario.

mod scenario;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use worms_core::{Command, Event};
use worms_system_turns::{is_finished, winner};
use worms_world::{query, World};

use scenario::Scenario;
use session::Session;

/// Command-line arguments accepted by the scenario runner.
#[derive(Debug, Parser)]
#[command(
    name = "worms",
    version,
    about = "Play a scripted Worms scenario and print the outcome"
)]
struct CliArgs {
    /// Path to the TOML scenario to play.
    #[arg(long, value_name = "PATH")]
    scenario: PathBuf,
    /// Seed for the random placement of worms without coordinates.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Log filter directive; falls back to `RUST_LOG`, then `info`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

/// Entry point for the Worms command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_level.as_deref())?;

    let scenario = Scenario::load(&args.scenario)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let world = scenario.build(&mut rng)?;
    let mut session = Session::new(world);

    let events = session
        .submit(Command::StartGame)
        .context("failed to start the game")?;
    log_events(&events);

    for (step, action) in scenario.actions.iter().copied().enumerate() {
        let Some(worm) = query::active_worm(session.world()) else {
            info!(step, "no_active_worm");
            break;
        };
        match session.submit(action.command(worm)) {
            Ok(events) => log_events(&events),
            Err(error) => warn!(step, worm = worm.get(), %error, "action_rejected"),
        }
    }

    print_summary(session.world());
    Ok(())
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter {directive:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn log_events(events: &[Event]) {
    for event in events {
        info!(?event, "event");
    }
}

fn print_summary(world: &World) {
    let view = query::worm_view(world);
    for worm in view.iter() {
        println!(
            "{:<16} x={:>8.3} y={:>8.3} r={:.3} ap={}/{} hp={}/{}{}{}",
            worm.name,
            worm.position.x(),
            worm.position.y(),
            worm.radius,
            worm.action_points,
            worm.max_action_points,
            worm.hit_points,
            worm.max_hit_points,
            if worm.alive { "" } else { " dead" },
            if worm.active { " active" } else { "" },
        );
    }

    let outcome = match winner(&view).and_then(|id| view.get(id)) {
        Some(survivor) => format!("winner: {}", survivor.name),
        None if is_finished(&view) => "no survivors".to_owned(),
        None => "undecided".to_owned(),
    };
    println!("{outcome}");
}
