#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Monster Dungeon encounters.
//!
//! The world owns the occupancy grid, the player and the enemy roster. It is
//! only ever mutated through [`apply`], which reports every observable change
//! as an [`Event`]. Membership changes of the roster are announced as
//! index-addressed insert and remove events so presentation layers can animate
//! entries and exits without diffing.

mod enemy;
mod grid;
mod player;

use monster_dungeon_core::{
    CellCoord, Command, Direction, EnemyId, EnemyTemplate, Event, Item, MoveRejection,
    ObservableVec, Occupant, RemovalCause, SequenceObserver, GRID_COLUMNS, GRID_ROWS,
    WELCOME_BANNER,
};
use tracing::{debug, info};

use self::{enemy::Enemy, player::Player};

pub use self::grid::OccupancyGrid;

/// Represents the authoritative Monster Dungeon world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: OccupancyGrid,
    player: Option<Player>,
    enemies: ObservableVec<Enemy>,
    next_enemy_id: u32,
    turn: u64,
}

impl World {
    /// Creates an empty world on the standard 8 by 10 grid.
    ///
    /// No player exists until [`Command::StartEncounter`] is applied.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimensions(GRID_COLUMNS, GRID_ROWS)
    }

    /// Creates an empty world with custom grid dimensions.
    #[must_use]
    pub fn with_dimensions(columns: u32, rows: u32) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: OccupancyGrid::new(columns, rows),
            player: None,
            enemies: ObservableVec::new(),
            next_enemy_id: 0,
            turn: 0,
        }
    }

    fn start_encounter(&mut self, requested: CellCoord, out_events: &mut Vec<Event>) {
        let mut observer = RosterEvents::removals(out_events, RemovalCause::EncounterReset);
        self.enemies.clear(&mut observer);
        self.grid.clear();
        self.turn = 0;

        let (columns, rows) = self.grid.dimensions();
        let start = CellCoord::new(
            requested.column().min(columns.saturating_sub(1)),
            requested.row().min(rows.saturating_sub(1)),
        );
        self.grid.set_occupied(start, Some(Occupant::Player));
        self.player = Some(Player::new(start));

        info!(column = start.column(), row = start.row(), "encounter started");
        out_events.push(Event::EncounterStarted { player: start });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let outcome = match self.player.as_mut() {
            None => Err(MoveRejection::NoPlayer),
            Some(player) if !player.is_alive() => Err(MoveRejection::Defeated),
            Some(player) => {
                let from = player.cell;
                match from.step(direction) {
                    Some(to) if self.grid.is_valid_position(to) => {
                        if self.grid.move_player(from, to) {
                            player.cell = to;
                            Ok((from, to))
                        } else {
                            Err(MoveRejection::Occupied)
                        }
                    }
                    _ => Err(MoveRejection::OutOfBounds),
                }
            }
        };

        match outcome {
            Ok((from, to)) => out_events.push(Event::PlayerMoved { from, to }),
            Err(reason) => {
                debug!(?direction, ?reason, "player move rejected");
                out_events.push(Event::PlayerMoveRejected { direction, reason });
            }
        }
    }

    fn descend_enemies(&mut self, out_events: &mut Vec<Event>) {
        let Some(player_row) = self.player.as_ref().map(|player| player.cell.row()) else {
            return;
        };

        let mut order: Vec<usize> = (0..self.enemies.len()).collect();
        order.sort_by_key(|&index| {
            std::cmp::Reverse(self.enemies.get(index).map_or(0, |enemy| enemy.cell.row()))
        });

        let mut passed: Vec<EnemyId> = Vec::new();
        for index in order {
            let Some(enemy) = self.enemies.get_mut(index) else {
                continue;
            };
            let from = enemy.cell;
            let to = from.below();
            let occupant = Occupant::Enemy(enemy.id);
            self.grid.release(from, occupant);

            if to.row() > player_row {
                passed.push(enemy.id);
                continue;
            }

            enemy.cell = to;
            let _ = self.grid.claim(to, occupant);
            out_events.push(Event::EnemyDescended {
                enemy: enemy.id,
                from,
                to,
            });
        }

        if !passed.is_empty() {
            let mut observer = RosterEvents::removals(out_events, RemovalCause::PassedPlayer);
            let _ = self
                .enemies
                .retain(|enemy| !passed.contains(&enemy.id), &mut observer);
        }

        self.turn = self.turn.saturating_add(1);
        debug!(turn = self.turn, passed = passed.len(), "enemies descended");
        out_events.push(Event::EnemiesDescended { turn: self.turn });
    }

    fn spawn_enemy(&mut self, column: u32, template: EnemyTemplate, out_events: &mut Vec<Event>) {
        let cell = CellCoord::new(column, 0);
        let id = EnemyId::new(self.next_enemy_id);
        if !self.grid.claim(cell, Occupant::Enemy(id)) {
            debug!(column, "spawn rejected");
            out_events.push(Event::SpawnRejected { column });
            return;
        }

        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        let mut observer = RosterEvents::arrivals(out_events);
        let _ = self
            .enemies
            .push(Enemy::spawn(id, cell, template), &mut observer);
    }

    fn apply_contact_damage(&mut self, enemy_id: EnemyId, raw: i32, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let in_contact = self.enemies.iter().any(|enemy| {
            enemy.id == enemy_id && enemy.cell == player.cell && enemy.is_alive() && !enemy.is_block
        });
        if !in_contact || !player.is_alive() {
            return;
        }

        let amount = player.take_damage(raw);
        let remaining = player.snapshot().health;
        debug!(enemy = enemy_id.get(), amount, remaining, "player hit by contact");
        out_events.push(Event::PlayerDamaged {
            source: enemy_id,
            amount,
            remaining,
        });
        if !player.is_alive() {
            info!("player defeated");
            out_events.push(Event::PlayerDefeated);
        }
    }

    fn strike_enemy(&mut self, target: CellCoord, counter: i32, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if !player.is_alive() {
            return;
        }
        let Some(index) = self
            .enemies
            .position(|enemy| enemy.cell == target && enemy.is_alive())
        else {
            return;
        };
        let Some(enemy) = self.enemies.get_mut(index) else {
            return;
        };

        let amount = enemy.take_damage(player.strike_damage());
        let remaining = enemy.health();
        let enemy_id = enemy.id;
        out_events.push(Event::EnemyStruck {
            enemy: enemy_id,
            amount,
            remaining,
        });

        if enemy.is_alive() {
            if enemy.is_block {
                return;
            }
            let lost = player.take_damage(counter);
            out_events.push(Event::PlayerDamaged {
                source: enemy_id,
                amount: lost,
                remaining: player.snapshot().health,
            });
            if !player.is_alive() {
                info!("player defeated");
                out_events.push(Event::PlayerDefeated);
            }
            return;
        }

        let (gold, experience) = (enemy.gold_reward, enemy.experience_reward);
        let levels = player.collect_reward(gold, experience);
        self.remove_enemy(index, RemovalCause::Slain, out_events);
        out_events.push(Event::RewardGranted { gold, experience });
        for level in levels {
            info!(level, "player leveled up");
            out_events.push(Event::PlayerLeveledUp { level });
        }
    }

    fn destroy_enemy(
        &mut self,
        enemy_id: EnemyId,
        cause: RemovalCause,
        out_events: &mut Vec<Event>,
    ) {
        if let Some(index) = self.enemies.position(|enemy| enemy.id == enemy_id) {
            self.remove_enemy(index, cause, out_events);
        }
    }

    fn remove_enemy(&mut self, index: usize, cause: RemovalCause, out_events: &mut Vec<Event>) {
        let mut observer = RosterEvents::removals(out_events, cause);
        if let Some(enemy) = self.enemies.remove(index, &mut observer) {
            self.grid.release(enemy.cell, Occupant::Enemy(enemy.id));
        }
    }

    fn heal_player(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if !player.is_alive() {
            return;
        }

        let restored = player.heal(amount);
        out_events.push(Event::PlayerHealed {
            amount: restored,
            health: player.snapshot().health,
        });
    }

    fn equip_item(&mut self, item: Item, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut() else {
            return;
        };

        player.inventory_mut().receive(item);
        let inventory = player.inventory();
        out_events.push(Event::InventoryChanged {
            attack_bonus: inventory.attack_bonus(),
            defense_bonus: inventory.defense_bonus(),
            carried: inventory.carried(),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartEncounter { player_start } => world.start_encounter(player_start, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::DescendEnemies => world.descend_enemies(out_events),
        Command::SpawnEnemy { column, template } => world.spawn_enemy(column, template, out_events),
        Command::ApplyContactDamage { enemy, raw_damage } => {
            world.apply_contact_damage(enemy, raw_damage, out_events);
        }
        Command::StrikeEnemy {
            target,
            counter_damage,
        } => world.strike_enemy(target, counter_damage, out_events),
        Command::DestroyEnemy { enemy, cause } => world.destroy_enemy(enemy, cause, out_events),
        Command::HealPlayer { amount } => world.heal_player(amount, out_events),
        Command::EquipItem { item } => world.equip_item(item, out_events),
    }
}

/// Forwards roster membership changes as world events.
///
/// Removals are only reported when the observer was built with a cause.
struct RosterEvents<'a> {
    out: &'a mut Vec<Event>,
    cause: Option<RemovalCause>,
}

impl<'a> RosterEvents<'a> {
    fn arrivals(out: &'a mut Vec<Event>) -> Self {
        Self { out, cause: None }
    }

    fn removals(out: &'a mut Vec<Event>, cause: RemovalCause) -> Self {
        Self {
            out,
            cause: Some(cause),
        }
    }
}

impl SequenceObserver<Enemy> for RosterEvents<'_> {
    fn inserted(&mut self, index: usize, item: &Enemy) {
        self.out.push(Event::EnemyInserted {
            index,
            enemy: item.snapshot(),
        });
    }

    fn removed(&mut self, index: usize, item: &Enemy) {
        if let Some(cause) = self.cause {
            self.out.push(Event::EnemyRemoved {
                index,
                enemy: item.id,
                cause,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use monster_dungeon_core::{CellCoord, EnemySnapshot, EnemyView, OccupancyView, PlayerSnapshot};

    use super::{OccupancyGrid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the occupancy grid.
    #[must_use]
    pub fn grid(world: &World) -> &OccupancyGrid {
        &world.grid
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }

    /// Captures the player's state, if an encounter has started.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        world.player.as_ref().map(|player| player.snapshot())
    }

    /// Reports whether a living player exists.
    #[must_use]
    pub fn is_player_alive(world: &World) -> bool {
        world.player.as_ref().is_some_and(|player| player.is_alive())
    }

    /// Captures a read-only view of the enemy roster in roster order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Live enemy standing in `cell`, if any.
    #[must_use]
    pub fn enemy_at(world: &World, cell: CellCoord) -> Option<EnemySnapshot> {
        world
            .enemies
            .iter()
            .find(|enemy| enemy.cell == cell && enemy.is_alive())
            .map(|enemy| enemy.snapshot())
    }

    /// Number of descents performed in the current encounter.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }
}
