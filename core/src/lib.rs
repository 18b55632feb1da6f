#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Monster Dungeon combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the combat systems. Systems submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that
//! presentation layers and systems react to. Read access flows through
//! immutable snapshots such as [`PlayerSnapshot`], [`EnemyView`] and
//! [`ProjectileView`].

mod enemy;
mod observable;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use enemy::{EnemyKind, EnemyTemplate, DEFAULT_EXPERIENCE_REWARD, DEFAULT_GOLD_REWARD};
pub use observable::{IgnoreChanges, ObservableVec, SequenceChange, SequenceObserver};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Monster Dungeon.";

/// Number of lanes (columns) on the combat grid.
pub const GRID_COLUMNS: u32 = 8;

/// Number of visible rows on the combat grid.
pub const GRID_ROWS: u32 = 10;

/// Cell the player occupies when an encounter starts.
pub const PLAYER_START: CellCoord = CellCoord::new(4, 8);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Resets the grid and enemy roster and places a fresh player.
    StartEncounter {
        /// Cell the player should occupy; clamped into the grid.
        player_start: CellCoord,
    },
    /// Requests a one-lane sideways step of the player.
    MovePlayer {
        /// Lane the player wants to step towards.
        direction: Direction,
    },
    /// Moves every enemy one row down, dropping enemies that pass the player.
    DescendEnemies,
    /// Requests a new enemy on the top row of the provided column.
    SpawnEnemy {
        /// Column the enemy should enter through.
        column: u32,
        /// Stat block applied to the enemy.
        template: EnemyTemplate,
    },
    /// Applies an enemy's rolled contact damage to the player.
    ApplyContactDamage {
        /// Enemy sharing the player's cell.
        enemy: EnemyId,
        /// Damage before the player's defense is subtracted.
        raw_damage: i32,
    },
    /// Performs a melee strike from the player against the enemy in `target`.
    StrikeEnemy {
        /// Cell holding the enemy to strike.
        target: CellCoord,
        /// Raw damage the enemy answers with if it survives.
        counter_damage: i32,
    },
    /// Removes an enemy outright.
    DestroyEnemy {
        /// Enemy to remove.
        enemy: EnemyId,
        /// Reason reported alongside the removal.
        cause: RemovalCause,
    },
    /// Restores player health, never beyond the maximum.
    HealPlayer {
        /// Health to restore.
        amount: u32,
    },
    /// Equips a weapon or armor, or stows any other item.
    EquipItem {
        /// Item handed to the player.
        item: Item,
    },
}

/// Events broadcast by the world and the combat systems.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the frame clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the frame.
        dt: Duration,
    },
    /// Announces that a fresh encounter began.
    EncounterStarted {
        /// Cell the player occupies.
        player: CellCoord,
    },
    /// Confirms that the player stepped between two cells.
    PlayerMoved {
        /// Cell the player left.
        from: CellCoord,
        /// Cell the player entered.
        to: CellCoord,
    },
    /// Reports that a move intent was refused; nothing else changed.
    PlayerMoveRejected {
        /// Direction of the refused step.
        direction: Direction,
        /// Specific reason the step was refused.
        reason: MoveRejection,
    },
    /// Announces that an enemy joined the roster at the provided index.
    EnemyInserted {
        /// Roster position of the new enemy.
        index: usize,
        /// State of the enemy on entry.
        enemy: EnemySnapshot,
    },
    /// Announces that an enemy left the roster from the provided index.
    EnemyRemoved {
        /// Roster position the enemy occupied before removal.
        index: usize,
        /// Identifier of the removed enemy.
        enemy: EnemyId,
        /// Reason for the removal.
        cause: RemovalCause,
    },
    /// Confirms that an enemy moved one row down.
    EnemyDescended {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Cell the enemy left.
        from: CellCoord,
        /// Cell the enemy entered.
        to: CellCoord,
    },
    /// Marks the end of a descent step.
    EnemiesDescended {
        /// Number of descents performed in this encounter, including this one.
        turn: u64,
    },
    /// Reports that a spawn request could not be honoured.
    SpawnRejected {
        /// Column named by the refused request.
        column: u32,
    },
    /// Reports damage applied to the player.
    PlayerDamaged {
        /// Enemy responsible for the damage.
        source: EnemyId,
        /// Health actually lost.
        amount: u32,
        /// Health remaining afterwards.
        remaining: u32,
    },
    /// Reports that the player's health reached zero.
    PlayerDefeated,
    /// Reports health restored to the player.
    PlayerHealed {
        /// Health actually restored.
        amount: u32,
        /// Health after healing.
        health: u32,
    },
    /// Reports damage dealt to an enemy by a melee strike.
    EnemyStruck {
        /// Identifier of the struck enemy.
        enemy: EnemyId,
        /// Health actually lost.
        amount: u32,
        /// Health remaining afterwards.
        remaining: u32,
    },
    /// Reports spoils granted to the player for slaying an enemy.
    RewardGranted {
        /// Gold added to the purse.
        gold: u32,
        /// Experience added to the total.
        experience: u32,
    },
    /// Reports that the player gained a level.
    PlayerLeveledUp {
        /// Level reached.
        level: u32,
    },
    /// Reports that the player's equipment or pack changed.
    InventoryChanged {
        /// Attack bonus granted by the equipped weapon.
        attack_bonus: i32,
        /// Defense bonus granted by the equipped armor.
        defense_bonus: i32,
        /// Number of items carried in the pack.
        carried: usize,
    },
    /// Announces that a projectile was fired and joined the active set.
    ProjectileInserted {
        /// Position of the projectile within the active set.
        index: usize,
        /// State of the projectile on entry.
        projectile: ProjectileSnapshot,
    },
    /// Announces that a projectile left the active set.
    ProjectileRemoved {
        /// Position the projectile occupied before removal.
        index: usize,
        /// Identifier of the removed projectile.
        projectile: ProjectileId,
        /// Reason for the removal.
        cause: ProjectileRemoval,
    },
}

/// Horizontal step directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Interprets a signed lane offset; only `-1` and `+1` are accepted.
    #[must_use]
    pub const fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -1 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    /// Signed lane offset produced by the direction.
    #[must_use]
    pub const fn offset(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Reasons a move intent may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// No encounter has placed a player yet.
    NoPlayer,
    /// The player has no health left.
    Defeated,
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is held by another entity.
    Occupied,
}

/// Reasons an enemy may leave the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalCause {
    /// The enemy's descent would have carried it past the player's row.
    PassedPlayer,
    /// A projectile struck the enemy.
    ProjectileHit {
        /// Projectile that landed the hit.
        projectile: ProjectileId,
    },
    /// The enemy's health reached zero.
    Slain,
    /// A new encounter cleared the roster.
    EncounterReset,
}

/// Reasons a projectile may leave the active set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileRemoval {
    /// The projectile crossed the top boundary of the grid.
    ExitedTop,
    /// The projectile struck a live enemy.
    Hit {
        /// Enemy that was struck.
        enemy: EnemyId,
    },
    /// A new encounter cleared the active set.
    EncounterReset,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Row zero is the top of the grid; enemies descend toward larger rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring cell on the same row, or `None` when it would underflow.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Option<Self> {
        let column = match direction {
            Direction::Left => self.column.checked_sub(1),
            Direction::Right => self.column.checked_add(1),
        };
        match column {
            Some(column) => Some(Self::new(column, self.row)),
            None => None,
        }
    }

    /// Cell directly beneath this one.
    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.column, self.row.saturating_add(1))
    }
}

/// Entity that claims a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// The player character.
    Player,
    /// A live enemy.
    Enemy(EnemyId),
}

/// Equipment categories known to the inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Raises attack while equipped.
    Weapon,
    /// Raises defense while equipped.
    Armor,
    /// Single-use supply.
    Consumable,
    /// Story item without stats.
    QuestItem,
    /// Crafting material.
    Material,
}

/// Item carried or equipped by the player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Display name.
    pub name: String,
    /// Equipment category.
    pub kind: ItemKind,
    /// Attack granted while equipped as a weapon.
    pub attack_bonus: i32,
    /// Defense granted while equipped as armor.
    pub defense_bonus: i32,
}

impl Item {
    /// Creates a weapon granting the provided attack bonus.
    #[must_use]
    pub fn weapon(name: impl Into<String>, attack_bonus: i32) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Weapon,
            attack_bonus,
            defense_bonus: 0,
        }
    }

    /// Creates armor granting the provided defense bonus.
    #[must_use]
    pub fn armor(name: impl Into<String>, defense_bonus: i32) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Armor,
            attack_bonus: 0,
            defense_bonus,
        }
    }
}

/// Health lost when `raw` damage meets `defense`.
///
/// At least one point always gets through.
#[must_use]
pub fn mitigated_damage(raw: i32, defense: i32) -> u32 {
    let through = i64::from(raw) - i64::from(defense);
    u32::try_from(through.max(1)).unwrap_or(u32::MAX)
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Grid cell currently occupied by the player.
    pub cell: CellCoord,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Base attack before equipment.
    pub attack: i32,
    /// Base defense before equipment.
    pub defense: i32,
    /// Attack granted by the equipped weapon.
    pub attack_bonus: i32,
    /// Defense granted by the equipped armor.
    pub defense_bonus: i32,
    /// Experience level.
    pub level: u32,
    /// Accumulated experience.
    pub experience: u32,
    /// Gold carried.
    pub gold: u32,
}

impl PlayerSnapshot {
    /// Reports whether the player still has health.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Defense applied against incoming damage.
    #[must_use]
    pub const fn effective_defense(&self) -> i32 {
        self.defense.saturating_add(self.defense_bonus)
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Grid cell currently occupied by the enemy.
    pub cell: CellCoord,
    /// Type tag of the enemy.
    pub kind: EnemyKind,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Raw attack before variance.
    pub attack: i32,
    /// Flat damage reduction.
    pub defense: i32,
    /// Marks an immobile obstacle.
    pub is_block: bool,
    /// Marks a floor guardian.
    pub is_boss: bool,
}

impl EnemySnapshot {
    /// Reports whether the enemy still has health.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Read-only snapshot describing the enemy roster in roster order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from snapshots already in roster order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<EnemySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the roster was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// First live enemy standing in `cell`, if any.
    #[must_use]
    pub fn live_at(&self, cell: CellCoord) -> Option<&EnemySnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.cell == cell && snapshot.is_alive())
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile used for interpolated rendering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Grid cell the projectile currently occupies.
    pub cell: CellCoord,
    /// Fractional row position; the cell row is its floor.
    pub offset: f32,
    /// Damage carried by the projectile.
    pub damage: u32,
}

/// Read-only snapshot describing every active projectile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from snapshots in firing order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ProjectileSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile was in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<Occupant>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cells.
    #[must_use]
    pub fn new(cells: &'a [Option<Occupant>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the entity claiming the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<Occupant> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell is blocked; cells outside the grid always are.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(true, |index| {
            self.cells.get(index).copied().unwrap_or(None).is_some()
        })
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Option<Occupant>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        mitigated_damage, CellCoord, Command, Direction, EnemyTemplate, Item, ItemKind,
        OccupancyView, Occupant,
    };
    use proptest::prelude::*;

    #[test]
    fn direction_accepts_unit_offsets_only() {
        assert_eq!(Direction::from_offset(-1), Some(Direction::Left));
        assert_eq!(Direction::from_offset(1), Some(Direction::Right));
        assert_eq!(Direction::from_offset(0), None);
        assert_eq!(Direction::from_offset(2), None);
        assert_eq!(Direction::Left.offset(), -1);
    }

    #[test]
    fn step_left_from_first_column_underflows() {
        assert_eq!(CellCoord::new(0, 8).step(Direction::Left), None);
        assert_eq!(
            CellCoord::new(0, 8).step(Direction::Right),
            Some(CellCoord::new(1, 8))
        );
    }

    #[test]
    fn occupancy_view_treats_outside_cells_as_blocked() {
        let cells = [None, Some(Occupant::Player), None, None];
        let view = OccupancyView::new(&cells, 2, 2);

        assert!(!view.is_occupied(CellCoord::new(0, 0)));
        assert!(view.is_occupied(CellCoord::new(1, 0)));
        assert!(view.is_occupied(CellCoord::new(2, 0)));
        assert!(view.is_occupied(CellCoord::new(0, 2)));
        assert_eq!(view.occupant(CellCoord::new(1, 0)), Some(Occupant::Player));
    }

    #[test]
    fn item_constructors_set_kind() {
        assert_eq!(Item::weapon("Sword", 4).kind, ItemKind::Weapon);
        assert_eq!(Item::armor("Mail", 3).defense_bonus, 3);
    }

    #[test]
    fn spawn_command_round_trips_through_bincode() {
        let command = Command::SpawnEnemy {
            column: 3,
            template: EnemyTemplate::block(1),
        };
        let bytes = bincode::serialize(&command).expect("serialize");
        let restored: Command = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, command);
    }

    proptest! {
        #[test]
        fn mitigation_never_drops_below_one(raw in -1_000i32..1_000, defense in -50i32..1_000) {
            let applied = mitigated_damage(raw, defense);
            prop_assert!(applied >= 1);
            prop_assert_eq!(i64::from(applied), (i64::from(raw) - i64::from(defense)).max(1));
        }
    }
}
