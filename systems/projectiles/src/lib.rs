#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous projectile simulation with row-sweep collision.
//!
//! Projectiles travel straight up their column at a fixed speed measured in
//! rows per second. Every frame checks the projectile's current cell, moves it,
//! and then sweeps every row it crossed from closest to farthest, so a fast
//! projectile cannot tunnel through an enemy between two frames. A hit is an
//! instant kill, requested from the world as [`Command::DestroyEnemy`].

use std::time::Duration;

use monster_dungeon_core::{
    CellCoord, Command, EnemyId, EnemyView, Event, ObservableVec, ProjectileId,
    ProjectileRemoval, ProjectileSnapshot, ProjectileView, RemovalCause, SequenceObserver,
};
use tracing::debug;

/// Rows per second travelled by a projectile unless configured otherwise.
pub const DEFAULT_SPEED: f32 = 5.0;

/// Damage carried by a projectile unless configured otherwise.
pub const DEFAULT_DAMAGE: u32 = 10;

/// Configuration parameters required to construct the projectile simulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    speed: f32,
    damage: u32,
}

impl Config {
    /// Creates a configuration with the provided upward speed and damage.
    #[must_use]
    pub const fn new(speed: f32, damage: u32) -> Self {
        Self { speed, damage }
    }

    /// Upward speed in rows per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Damage carried by each projectile.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED, DEFAULT_DAMAGE)
    }
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    id: ProjectileId,
    column: u32,
    offset: f32,
    damage: u32,
}

impl Projectile {
    fn row(&self) -> u32 {
        row_of(self.offset)
    }

    fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            cell: CellCoord::new(self.column, self.row()),
            offset: self.offset,
            damage: self.damage,
        }
    }
}

fn row_of(offset: f32) -> u32 {
    if offset <= 0.0 {
        0
    } else {
        offset.floor() as u32
    }
}

/// Owns every projectile in flight and advances them frame by frame.
#[derive(Debug)]
pub struct ProjectileSimulator {
    config: Config,
    active: ObservableVec<Projectile>,
    next_id: u32,
}

impl ProjectileSimulator {
    /// Creates an idle simulator.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            active: ObservableVec::new(),
            next_id: 0,
        }
    }

    /// Launches a projectile from `origin`, starting at the origin row.
    pub fn fire(&mut self, origin: CellCoord, out_events: &mut Vec<Event>) -> ProjectileId {
        let id = ProjectileId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let projectile = Projectile {
            id,
            column: origin.column(),
            offset: origin.row() as f32,
            damage: self.config.damage,
        };
        let mut observer = FlightEvents::new(out_events, &[]);
        let _ = self.active.push(projectile, &mut observer);
        debug!(
            projectile = id.get(),
            column = origin.column(),
            row = origin.row(),
            "projectile fired"
        );
        id
    }

    /// Advances every projectile by `dt`, resolving hits against `enemies`.
    ///
    /// Hits are emitted as [`Command::DestroyEnemy`] for the world to apply.
    /// An enemy is hit at most once per frame. A zero `dt` only checks each
    /// projectile's current cell.
    pub fn advance(
        &mut self,
        dt: Duration,
        enemies: &EnemyView,
        out_events: &mut Vec<Event>,
        out_commands: &mut Vec<Command>,
    ) {
        if self.active.is_empty() {
            return;
        }

        let distance = self.config.speed * dt.as_secs_f32();
        let mut struck: Vec<EnemyId> = Vec::new();
        let mut finished: Vec<(ProjectileId, ProjectileRemoval)> = Vec::new();

        for projectile in self.active.iter_mut() {
            let previous_row = projectile.row();
            let mut hit = live_enemy(enemies, projectile.column, previous_row, &struck);

            if hit.is_none() && distance > 0.0 {
                projectile.offset -= distance;
                let lowest = projectile.row();
                hit = (lowest..=previous_row)
                    .rev()
                    .find_map(|row| live_enemy(enemies, projectile.column, row, &struck));
            }

            if let Some(enemy) = hit {
                struck.push(enemy);
                finished.push((projectile.id, ProjectileRemoval::Hit { enemy }));
                out_commands.push(Command::DestroyEnemy {
                    enemy,
                    cause: RemovalCause::ProjectileHit {
                        projectile: projectile.id,
                    },
                });
                debug!(projectile = projectile.id.get(), enemy = enemy.get(), "projectile hit");
            } else if projectile.offset < 0.0 {
                finished.push((projectile.id, ProjectileRemoval::ExitedTop));
            }
        }

        if finished.is_empty() {
            return;
        }
        let mut observer = FlightEvents::new(out_events, &finished);
        let _ = self.active.retain(
            |projectile| !finished.iter().any(|(id, _)| *id == projectile.id),
            &mut observer,
        );
    }

    /// Removes every projectile in flight.
    pub fn clear(&mut self, out_events: &mut Vec<Event>) {
        let mut observer = FlightEvents::new(out_events, &[]);
        self.active.clear(&mut observer);
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Captures the projectiles in flight in firing order.
    #[must_use]
    pub fn view(&self) -> ProjectileView {
        ProjectileView::from_snapshots(self.active.iter().map(Projectile::snapshot).collect())
    }

    /// Configuration the simulator was built with.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }
}

fn live_enemy(enemies: &EnemyView, column: u32, row: u32, struck: &[EnemyId]) -> Option<EnemyId> {
    enemies
        .iter()
        .find(|enemy| {
            enemy.cell == CellCoord::new(column, row)
                && enemy.is_alive()
                && !struck.contains(&enemy.id)
        })
        .map(|enemy| enemy.id)
}

/// Forwards active-set membership changes as events.
struct FlightEvents<'a> {
    out: &'a mut Vec<Event>,
    causes: &'a [(ProjectileId, ProjectileRemoval)],
}

impl<'a> FlightEvents<'a> {
    fn new(out: &'a mut Vec<Event>, causes: &'a [(ProjectileId, ProjectileRemoval)]) -> Self {
        Self { out, causes }
    }
}

impl SequenceObserver<Projectile> for FlightEvents<'_> {
    fn inserted(&mut self, index: usize, item: &Projectile) {
        self.out.push(Event::ProjectileInserted {
            index,
            projectile: item.snapshot(),
        });
    }

    fn removed(&mut self, index: usize, item: &Projectile) {
        let cause = self
            .causes
            .iter()
            .find(|(id, _)| *id == item.id)
            .map_or(ProjectileRemoval::EncounterReset, |(_, cause)| *cause);
        self.out.push(Event::ProjectileRemoved {
            index,
            projectile: item.id,
            cause,
        });
    }
}
