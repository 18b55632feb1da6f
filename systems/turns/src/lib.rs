#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn sequencing for the lane combat loop.
//!
//! A player turn validates the requested sideways step, descends every enemy
//! by one row, runs the spawn policy and finally resolves contact damage from
//! enemies sharing the player's cell. Each stage is expressed as world
//! commands so the world stays the single owner of state.

use monster_dungeon_core::{
    CellCoord, Command, Direction, EnemyView, Event, MoveRejection, PlayerSnapshot, RemovalCause,
};
use monster_dungeon_system_spawning::Spawning;
use monster_dungeon_world::{self as world, query, World};
use rand::Rng;
use tracing::debug;

/// Largest deviation applied to an attack roll in either direction.
pub const ATTACK_VARIANCE: i32 = 2;

/// Result of validating a sideways step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveCheck {
    /// The player stepped between the two cells.
    Accepted {
        /// Cell the player left.
        from: CellCoord,
        /// Cell the player entered.
        to: CellCoord,
    },
    /// The step was refused and nothing changed.
    Rejected(MoveRejection),
}

/// Summary of the descent, spawn and contact stages of one turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Descent count of the encounter after this turn.
    pub turn: u64,
    /// Enemies removed because they passed the player's row.
    pub passed: usize,
    /// Enemies that entered the top row.
    pub spawned: usize,
    /// Enemies that dealt contact damage.
    pub contacts: usize,
    /// Health the player lost to contact damage.
    pub damage_taken: u32,
    /// Whether the player was defeated during this turn.
    pub player_defeated: bool,
}

/// Result of a full player turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The step was refused; the turn did not run.
    Rejected(MoveRejection),
    /// The step succeeded and the rest of the turn ran.
    Completed(TurnReport),
}

/// Drives the ordered stages of a turn against the world.
#[derive(Debug)]
pub struct TurnSequencer {
    spawning: Spawning,
}

impl TurnSequencer {
    /// Creates a sequencer that consults `spawning` after each descent.
    #[must_use]
    pub fn new(spawning: Spawning) -> Self {
        Self { spawning }
    }

    /// Spawn policy consulted after each descent.
    #[must_use]
    pub fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    /// Attempts the player's step, reporting whether it was accepted.
    pub fn validate_move(
        &self,
        world: &mut World,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> MoveCheck {
        let mut events = Vec::new();
        world::apply(world, Command::MovePlayer { direction }, &mut events);

        let check = events
            .iter()
            .find_map(|event| match event {
                Event::PlayerMoved { from, to } => Some(MoveCheck::Accepted {
                    from: *from,
                    to: *to,
                }),
                Event::PlayerMoveRejected { reason, .. } => Some(MoveCheck::Rejected(*reason)),
                _ => None,
            })
            .unwrap_or(MoveCheck::Rejected(MoveRejection::NoPlayer));
        out_events.extend(events);
        check
    }

    /// Runs descent, spawning and contact resolution.
    pub fn advance<R: Rng>(
        &mut self,
        world: &mut World,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> TurnReport {
        let mut report = TurnReport::default();

        let mut descent = Vec::new();
        world::apply(world, Command::DescendEnemies, &mut descent);
        report.passed = descent
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::EnemyRemoved {
                        cause: RemovalCause::PassedPlayer,
                        ..
                    }
                )
            })
            .count();

        let mut commands = Vec::new();
        let _ = self
            .spawning
            .handle(&descent, &query::enemy_view(world), rng, &mut commands);
        out_events.extend(descent);

        let mut staged = Vec::new();
        for command in commands.drain(..) {
            world::apply(world, command, &mut staged);
        }
        report.spawned = staged
            .iter()
            .filter(|event| matches!(event, Event::EnemyInserted { .. }))
            .count();
        out_events.extend(staged.drain(..));

        if let Some(player) = query::player(world).filter(PlayerSnapshot::is_alive) {
            let enemies = query::enemy_view(world);
            report.contacts = resolve_contacts(&player, &enemies, rng, &mut commands);
            for command in commands {
                world::apply(world, command, &mut staged);
            }
            for event in &staged {
                match event {
                    Event::PlayerDamaged { amount, .. } => {
                        report.damage_taken = report.damage_taken.saturating_add(*amount);
                    }
                    Event::PlayerDefeated => report.player_defeated = true,
                    _ => {}
                }
            }
            out_events.extend(staged);
        }

        report.turn = query::turn(world);
        debug!(
            turn = report.turn,
            passed = report.passed,
            spawned = report.spawned,
            contacts = report.contacts,
            damage = report.damage_taken,
            "turn advanced"
        );
        report
    }

    /// Runs a complete turn: the step first, then descent, spawning and contact.
    ///
    /// A refused step aborts the turn without touching the enemies.
    pub fn play_turn<R: Rng>(
        &mut self,
        world: &mut World,
        direction: Direction,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> TurnOutcome {
        match self.validate_move(world, direction, out_events) {
            MoveCheck::Rejected(reason) => TurnOutcome::Rejected(reason),
            MoveCheck::Accepted { .. } => {
                TurnOutcome::Completed(self.advance(world, rng, out_events))
            }
        }
    }
}

/// Rolls `attack` with a uniform deviation of up to [`ATTACK_VARIANCE`].
pub fn roll_attack<R: Rng>(attack: i32, rng: &mut R) -> i32 {
    attack.saturating_add(rng.gen_range(-ATTACK_VARIANCE..=ATTACK_VARIANCE))
}

/// Emits contact damage for every live, non-block enemy in the player's cell.
///
/// Returns the number of damage commands emitted.
pub fn resolve_contacts<R: Rng>(
    player: &PlayerSnapshot,
    enemies: &EnemyView,
    rng: &mut R,
    out: &mut Vec<Command>,
) -> usize {
    let mut emitted = 0;
    for enemy in enemies.iter() {
        if enemy.cell != player.cell || !enemy.is_alive() || enemy.is_block {
            continue;
        }
        out.push(Command::ApplyContactDamage {
            enemy: enemy.id,
            raw_damage: roll_attack(enemy.attack, rng),
        });
        emitted += 1;
    }
    emitted
}
