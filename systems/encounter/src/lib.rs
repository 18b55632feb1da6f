#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat encounter controller tying the world and the combat systems together.
//!
//! The controller owns one [`World`], the turn sequencer and the projectile
//! simulator, and exposes the player's intents as methods. Two cadences drive
//! it: turn intents such as [`Encounter::move_player`] and frame ticks through
//! [`Encounter::tick`]. Firing arms a short grace window during which the
//! descent of a turn is held back; the player's own step is never delayed.
//! Every change is recorded as an [`Event`] and handed out by
//! [`Encounter::drain_events`].

mod config;
mod scheduler;

use std::time::Duration;

use monster_dungeon_core::{
    CellCoord, Command, Direction, EnemyId, EnemyTemplate, EnemyView, Event, Item, MoveRejection,
    OccupancyView, PlayerSnapshot, ProjectileId, ProjectileView, RemovalCause,
};
use monster_dungeon_system_projectiles::ProjectileSimulator;
use monster_dungeon_system_spawning::Spawning;
use monster_dungeon_system_turns::{roll_attack, MoveCheck, TurnOutcome, TurnReport, TurnSequencer};
use monster_dungeon_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use config::{ConfigError, EncounterConfig, DEFAULT_DESCENT_DELAY_MS};
pub use scheduler::DeferredAction;

/// Result of a turn-spending intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The intent was refused and nothing changed.
    Blocked(MoveRejection),
    /// The turn ran to completion.
    Advanced(TurnReport),
    /// The turn's descent is waiting for the grace window to close.
    Deferred,
}

/// Result of a melee strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// The player cannot act.
    Blocked(MoveRejection),
    /// The target cell is not next to the player.
    OutOfReach,
    /// No live enemy stands in the target cell.
    NoTarget,
    /// The strike landed and the turn was spent.
    Resolved {
        /// Whether the strike slew the enemy.
        slain: bool,
        /// Outcome of the turn spent by the strike.
        turn: MoveOutcome,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingTurn {
    Descend,
}

/// One bounded combat session.
#[derive(Debug)]
pub struct Encounter {
    config: EncounterConfig,
    world: World,
    turns: TurnSequencer,
    projectiles: ProjectileSimulator,
    delay: DeferredAction<PendingTurn>,
    rng: ChaCha8Rng,
    events: Vec<Event>,
}

impl Encounter {
    /// Creates an encounter from `config`; call [`Encounter::start`] to begin.
    ///
    /// Invalid settings fall back to their defaults.
    #[must_use]
    pub fn new(config: EncounterConfig) -> Self {
        let config = sanitize(config);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let spawning = Spawning::new(config.spawning(), &mut rng);

        Self {
            world: World::new(),
            turns: TurnSequencer::new(spawning),
            projectiles: ProjectileSimulator::new(config.projectiles()),
            delay: DeferredAction::new(),
            rng,
            events: Vec::new(),
            config,
        }
    }

    /// Resets the board, drops every projectile and disarms the grace window.
    pub fn start(&mut self) {
        self.projectiles.clear(&mut self.events);
        self.delay.cancel();
        self.turns = TurnSequencer::new(Spawning::new(self.config.spawning(), &mut self.rng));
        world::apply(
            &mut self.world,
            Command::StartEncounter {
                player_start: self.config.player_start(),
            },
            &mut self.events,
        );
        info!(seed = self.config.seed, "encounter ready");
    }

    /// Steps the player one lane sideways and spends a turn.
    pub fn move_player(&mut self, direction: Direction) -> MoveOutcome {
        if !self.delay.is_armed() {
            return match self.turns.play_turn(
                &mut self.world,
                direction,
                &mut self.rng,
                &mut self.events,
            ) {
                TurnOutcome::Rejected(reason) => MoveOutcome::Blocked(reason),
                TurnOutcome::Completed(report) => MoveOutcome::Advanced(report),
            };
        }

        match self
            .turns
            .validate_move(&mut self.world, direction, &mut self.events)
        {
            MoveCheck::Rejected(reason) => MoveOutcome::Blocked(reason),
            MoveCheck::Accepted { .. } => self.defer_turn(),
        }
    }

    /// Spends a turn without moving.
    pub fn wait(&mut self) -> MoveOutcome {
        if let Err(reason) = self.ready_player() {
            return MoveOutcome::Blocked(reason);
        }
        self.spend_turn()
    }

    /// Fires a projectile from the player's cell and arms the grace window.
    ///
    /// Returns `None` when there is no living player.
    pub fn fire(&mut self) -> Option<ProjectileId> {
        let player = self.ready_player().ok()?;
        let id = self.projectiles.fire(player.cell, &mut self.events);

        let delay = self.config.descent_delay();
        if !delay.is_zero() {
            self.delay.arm(delay);
        }
        Some(id)
    }

    /// Advances projectiles by `dt`, then the grace window.
    ///
    /// Returns the report of a held-back turn if the window closed during
    /// this tick.
    pub fn tick(&mut self, dt: Duration) -> Option<TurnReport> {
        self.events.push(Event::TimeAdvanced { dt });

        if !self.projectiles.is_idle() {
            let mut commands = Vec::new();
            self.projectiles.advance(
                dt,
                &query::enemy_view(&self.world),
                &mut self.events,
                &mut commands,
            );
            for command in commands {
                world::apply(&mut self.world, command, &mut self.events);
            }
        }

        match self.delay.advance(dt)? {
            PendingTurn::Descend => {
                let report = self
                    .turns
                    .advance(&mut self.world, &mut self.rng, &mut self.events);
                debug!(turn = report.turn, "held-back turn released");
                Some(report)
            }
        }
    }

    /// Strikes the enemy in `target` in melee, then spends a turn.
    ///
    /// A surviving enemy answers with a counter-attack; blocks never do.
    pub fn strike(&mut self, target: CellCoord) -> StrikeOutcome {
        let player = match self.ready_player() {
            Ok(player) => player,
            Err(reason) => return StrikeOutcome::Blocked(reason),
        };
        if !within_reach(player.cell, target) {
            return StrikeOutcome::OutOfReach;
        }
        let Some(enemy) = query::enemy_at(&self.world, target) else {
            return StrikeOutcome::NoTarget;
        };

        let counter_damage = roll_attack(enemy.attack, &mut self.rng);
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::StrikeEnemy {
                target,
                counter_damage,
            },
            &mut events,
        );
        let slain = events.iter().any(|event| {
            matches!(
                event,
                Event::EnemyRemoved {
                    cause: RemovalCause::Slain,
                    ..
                }
            )
        });
        self.events.extend(events);
        debug!(enemy = enemy.id.get(), slain, "melee strike");

        let turn = match self.ready_player() {
            Ok(_) => self.spend_turn(),
            Err(reason) => MoveOutcome::Blocked(reason),
        };
        StrikeOutcome::Resolved { slain, turn }
    }

    /// Hands `item` to the player, equipping weapons and armor.
    pub fn equip(&mut self, item: Item) {
        world::apply(&mut self.world, Command::EquipItem { item }, &mut self.events);
    }

    /// Restores up to `amount` health to a living player.
    pub fn heal(&mut self, amount: u32) {
        world::apply(&mut self.world, Command::HealPlayer { amount }, &mut self.events);
    }

    /// Places an enemy on the top row of `column`, bypassing the spawn policy.
    ///
    /// Returns `None` when the cell is taken or outside the grid.
    pub fn spawn_enemy(&mut self, column: u32, template: EnemyTemplate) -> Option<EnemyId> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SpawnEnemy { column, template },
            &mut events,
        );
        let spawned = events.iter().find_map(|event| match event {
            Event::EnemyInserted { enemy, .. } => Some(enemy.id),
            _ => None,
        });
        self.events.extend(events);
        spawned
    }

    /// Captures the player's state, if an encounter has started.
    #[must_use]
    pub fn player(&self) -> Option<PlayerSnapshot> {
        query::player(&self.world)
    }

    /// Captures the enemy roster in roster order.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Captures the projectiles in flight in firing order.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        self.projectiles.view()
    }

    /// Exposes the occupancy grid.
    #[must_use]
    pub fn occupancy(&self) -> OccupancyView<'_> {
        query::occupancy_view(&self.world)
    }

    /// Reports whether a living player exists.
    #[must_use]
    pub fn is_player_alive(&self) -> bool {
        query::is_player_alive(&self.world)
    }

    /// Reports whether projectiles are in flight and frames need ticking.
    #[must_use]
    pub fn is_simulating(&self) -> bool {
        !self.projectiles.is_idle()
    }

    /// Reports whether the grace window is open.
    #[must_use]
    pub fn is_delay_armed(&self) -> bool {
        self.delay.is_armed()
    }

    /// Reports whether a turn's descent is waiting for the grace window.
    #[must_use]
    pub fn descent_pending(&self) -> bool {
        self.delay.is_pending()
    }

    /// Descents performed since the encounter started.
    #[must_use]
    pub fn turn(&self) -> u64 {
        query::turn(&self.world)
    }

    /// Banner presentation layers may display on start.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Configuration the encounter runs with.
    #[must_use]
    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    /// Takes every event recorded since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn ready_player(&self) -> Result<PlayerSnapshot, MoveRejection> {
        match query::player(&self.world) {
            None => Err(MoveRejection::NoPlayer),
            Some(player) if !player.is_alive() => Err(MoveRejection::Defeated),
            Some(player) => Ok(player),
        }
    }

    fn spend_turn(&mut self) -> MoveOutcome {
        if self.delay.is_armed() {
            return self.defer_turn();
        }
        MoveOutcome::Advanced(
            self.turns
                .advance(&mut self.world, &mut self.rng, &mut self.events),
        )
    }

    fn defer_turn(&mut self) -> MoveOutcome {
        if self.delay.defer(PendingTurn::Descend) {
            debug!("turn held back by grace window");
        } else {
            debug!("turn absorbed by pending descent");
        }
        MoveOutcome::Deferred
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new(EncounterConfig::default())
    }
}

fn within_reach(from: CellCoord, to: CellCoord) -> bool {
    from.column().abs_diff(to.column()) <= 1 && from.row().abs_diff(to.row()) <= 1
}

fn sanitize(mut config: EncounterConfig) -> EncounterConfig {
    if let Err(error) = config.validate() {
        warn!(%error, "invalid encounter configuration, using defaults for rejected values");
        let defaults = EncounterConfig::default();
        if !(config.projectile_speed > 0.0) {
            config.projectile_speed = defaults.projectile_speed;
        }
    }
    config
}
