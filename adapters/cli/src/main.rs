#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Monster Dungeon encounter from a script.

mod render;
mod script;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use monster_dungeon_core::{
    CellCoord, EnemySnapshot, EnemyTemplate, Event, PlayerSnapshot, ProjectileSnapshot,
};
use monster_dungeon_system_encounter::{Encounter, EncounterConfig};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::script::Intent;

/// Headless Monster Dungeon driver.
#[derive(Debug, Parser)]
#[command(name = "monster-dungeon", version, about)]
struct Args {
    /// TOML file with encounter settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured random seed.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Intents to play: L/R step, F fire, `.` wait, A strike upward, B summon a boss.
    #[arg(long, default_value = "F.L.R.")]
    script: String,

    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 100)]
    frame_ms: u64,

    /// Frames ticked after each intent.
    #[arg(long, default_value_t = 4)]
    frames: u32,

    /// Prints the final state and event log as JSON instead of boards.
    #[arg(long)]
    json: bool,
}

/// Final state and event log printed in JSON mode.
#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    turn: u64,
    player: Option<PlayerSnapshot>,
    enemies: Vec<EnemySnapshot>,
    projectiles: Vec<ProjectileSnapshot>,
    events: Vec<Event>,
}

/// Entry point for the Monster Dungeon command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EncounterConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let intents = script::parse(&args.script).context("invalid intent script")?;

    let mut encounter = Encounter::new(config);
    encounter.start();
    if !args.json {
        println!("{}", encounter.welcome_banner());
        println!("{}\n", draw(&encounter));
    }

    let frame = Duration::from_millis(args.frame_ms);
    let mut log = encounter.drain_events();
    for (step, intent) in intents.into_iter().enumerate() {
        play(&mut encounter, intent);
        for _ in 0..args.frames {
            let _ = encounter.tick(frame);
        }
        log.extend(encounter.drain_events());

        if !args.json {
            println!("#{} {intent:?} (turn {})", step + 1, encounter.turn());
            println!("{}\n", draw(&encounter));
        }
        if !encounter.is_player_alive() {
            info!(step = step + 1, "player defeated, stopping script");
            break;
        }
    }

    if args.json {
        log.retain(|event| !matches!(event, Event::TimeAdvanced { .. }));
        let summary = Summary {
            seed: encounter.config().seed,
            turn: encounter.turn(),
            player: encounter.player(),
            enemies: encounter.enemies().into_vec(),
            projectiles: encounter.projectiles().into_vec(),
            events: log,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        );
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<EncounterConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    EncounterConfig::from_toml_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))
}

fn play(encounter: &mut Encounter, intent: Intent) {
    match intent {
        Intent::Move(direction) => {
            let outcome = encounter.move_player(direction);
            debug!(?direction, ?outcome, "move");
        }
        Intent::Fire => {
            let projectile = encounter.fire();
            debug!(?projectile, "fire");
        }
        Intent::Wait => {
            let outcome = encounter.wait();
            debug!(?outcome, "wait");
        }
        Intent::Strike => {
            let Some(player) = encounter.player() else {
                return;
            };
            let Some(row) = player.cell.row().checked_sub(1) else {
                return;
            };
            let outcome = encounter.strike(CellCoord::new(player.cell.column(), row));
            debug!(?outcome, "strike");
        }
        Intent::Boss => {
            let Some(player) = encounter.player() else {
                return;
            };
            let level = encounter.config().difficulty.unwrap_or(1).max(1);
            let boss = encounter.spawn_enemy(player.cell.column(), EnemyTemplate::boss(level));
            debug!(?boss, level, "boss summoned");
        }
    }
}

fn draw(encounter: &Encounter) -> String {
    render::board(
        encounter.occupancy().dimensions(),
        encounter.player().as_ref(),
        &encounter.enemies(),
        &encounter.projectiles(),
    )
}
