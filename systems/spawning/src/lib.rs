#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn policy responsible for emitting enemy spawn commands between turns.
//!
//! The policy counts executed turns. Once the count reaches a randomly drawn
//! threshold it requests between one and three enemies on distinct free
//! columns of the top row, then draws a fresh threshold.

use monster_dungeon_core::{Command, EnemyTemplate, EnemyView, Event, GRID_COLUMNS};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MIN_DRAW: u32 = 1;
const MAX_DRAW: u32 = 3;

/// Stat blocks handed to newly spawned enemies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Roster {
    /// Every enemy uses [`EnemyTemplate::standard`].
    #[default]
    Standard,
    /// Enemies follow the difficulty ladder of [`EnemyTemplate::for_difficulty`].
    Scaled {
        /// Dungeon difficulty driving the ladder.
        difficulty: u32,
    },
}

impl Roster {
    fn template(self) -> EnemyTemplate {
        match self {
            Self::Standard => EnemyTemplate::standard(),
            Self::Scaled { difficulty } => EnemyTemplate::for_difficulty(difficulty),
        }
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    columns: u32,
    roster: Roster,
}

impl Config {
    /// Creates a new configuration spawning across `columns` lanes.
    #[must_use]
    pub const fn new(columns: u32, roster: Roster) -> Self {
        Self { columns, roster }
    }

    /// Number of lanes enemies may enter through.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Roster used for spawned enemies.
    #[must_use]
    pub const fn roster(&self) -> Roster {
        self.roster
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(GRID_COLUMNS, Roster::Standard)
    }
}

/// Pure system that emits spawn commands once enough turns have elapsed.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    move_counter: u32,
    threshold: u32,
}

impl Spawning {
    /// Creates a new spawning system, drawing the first threshold from `rng`.
    #[must_use]
    pub fn new<R: Rng>(config: Config, rng: &mut R) -> Self {
        Self {
            config,
            move_counter: 0,
            threshold: rng.gen_range(MIN_DRAW..=MAX_DRAW),
        }
    }

    /// Turns counted since the last spawn trigger.
    #[must_use]
    pub const fn move_counter(&self) -> u32 {
        self.move_counter
    }

    /// Turns required before the next spawn trigger.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Counts one executed turn.
    pub fn record_turn(&mut self) {
        self.move_counter = self.move_counter.saturating_add(1);
    }

    /// Emits spawn commands when the counter has reached the threshold.
    ///
    /// Returns the number of enemies requested. A trigger always resets the
    /// counter and redraws the threshold, even when every draw was skipped.
    pub fn try_spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) -> usize {
        if self.move_counter < self.threshold {
            return 0;
        }

        let draws = rng.gen_range(MIN_DRAW..=MAX_DRAW);
        let mut requested: Vec<u32> = Vec::new();
        if self.config.columns > 0 {
            for _ in 0..draws {
                let column = rng.gen_range(0..self.config.columns);
                let taken = requested.contains(&column)
                    || enemies
                        .iter()
                        .any(|enemy| enemy.cell.column() == column && enemy.cell.row() == 0);
                if taken {
                    debug!(column, "spawn draw skipped");
                    continue;
                }
                requested.push(column);
            }
        }

        for &column in &requested {
            out.push(Command::SpawnEnemy {
                column,
                template: self.config.roster.template(),
            });
        }

        self.move_counter = 0;
        self.threshold = rng.gen_range(MIN_DRAW..=MAX_DRAW);
        debug!(
            draws,
            requested = requested.len(),
            threshold = self.threshold,
            "spawn triggered"
        );
        requested.len()
    }

    /// Counts descents reported in `events`, then runs the spawn check.
    pub fn handle<R: Rng>(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> usize {
        let descents = events
            .iter()
            .filter(|event| matches!(event, Event::EnemiesDescended { .. }))
            .count();
        for _ in 0..descents {
            self.record_turn();
        }

        if descents == 0 {
            return 0;
        }
        self.try_spawn(rng, enemies, out)
    }
}
