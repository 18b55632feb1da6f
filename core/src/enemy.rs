//! Enemy archetypes and the stat templates used when spawning them.

use serde::{Deserialize, Serialize};

/// Gold awarded for defeating an enemy unless a template overrides it.
pub const DEFAULT_GOLD_REWARD: u32 = 10;
/// Experience awarded for defeating an enemy unless a template overrides it.
pub const DEFAULT_EXPERIENCE_REWARD: u32 = 25;

/// Type tag attached to every enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Weak melee attacker, the default spawn.
    Goblin,
    /// Undead soldier with moderate armor.
    Skeleton,
    /// Heavy hitter with thick hide.
    Orc,
    /// Fast spectral attacker.
    Wraith,
    /// Gelatinous filler enemy.
    Slime,
    /// Slow undead brawler.
    Zombie,
    /// Blood-draining night stalker.
    Vampire,
    /// Apex monster of deep floors.
    Dragon,
    /// Immobile obstacle that never attacks.
    Block,
    /// Floor guardian.
    Boss,
}

impl EnemyKind {
    /// Single-character glyph used by text renderers.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Goblin => 'g',
            Self::Skeleton => 's',
            Self::Orc => 'o',
            Self::Wraith => 'w',
            Self::Slime => 'j',
            Self::Zombie => 'z',
            Self::Vampire => 'v',
            Self::Dragon => 'D',
            Self::Block => '#',
            Self::Boss => 'B',
        }
    }
}

/// Stat block applied to an enemy at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Type tag assigned to the enemy.
    pub kind: EnemyKind,
    /// Starting and maximum health.
    pub health: u32,
    /// Raw attack before variance.
    pub attack: i32,
    /// Flat damage reduction.
    pub defense: i32,
    /// Marks an immobile obstacle that never deals contact damage.
    pub is_block: bool,
    /// Marks a floor guardian.
    pub is_boss: bool,
    /// Gold granted when the enemy is slain in melee.
    pub gold_reward: u32,
    /// Experience granted when the enemy is slain in melee.
    pub experience_reward: u32,
}

impl EnemyTemplate {
    /// Template used by the spawn policy: 30 health, 5 attack, 2 defense.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            kind: EnemyKind::Goblin,
            health: 30,
            attack: 5,
            defense: 2,
            is_block: false,
            is_boss: false,
            gold_reward: DEFAULT_GOLD_REWARD,
            experience_reward: DEFAULT_EXPERIENCE_REWARD,
        }
    }

    /// Regular enemy scaled to the provided difficulty.
    ///
    /// The kind advances every three difficulty levels through goblin,
    /// skeleton, orc and wraith, saturating at wraith.
    #[must_use]
    pub fn for_difficulty(difficulty: u32) -> Self {
        const LADDER: [EnemyKind; 4] = [
            EnemyKind::Goblin,
            EnemyKind::Skeleton,
            EnemyKind::Orc,
            EnemyKind::Wraith,
        ];
        let rung = usize::try_from(difficulty / 3).unwrap_or(usize::MAX);
        let kind = LADDER[rung.min(LADDER.len() - 1)];
        let (health, attack, defense): (u32, i32, i32) = match kind {
            EnemyKind::Skeleton => (15, 5, 3),
            EnemyKind::Orc => (25, 8, 5),
            EnemyKind::Wraith => (20, 7, 2),
            _ => (10, 3, 1),
        };
        let scaled = to_stat(difficulty);

        Self {
            kind,
            health: difficulty.saturating_mul(2).saturating_add(health),
            attack: attack.saturating_add(scaled / 2),
            defense: defense.saturating_add(scaled / 3),
            ..Self::standard()
        }
    }

    /// Immobile obstacle with effectively impenetrable defense.
    #[must_use]
    pub fn block(difficulty: u32) -> Self {
        Self {
            kind: EnemyKind::Block,
            health: difficulty.saturating_mul(5).saturating_add(50),
            attack: 0,
            defense: 999,
            is_block: true,
            ..Self::standard()
        }
    }

    /// Floor guardian scaled to the dungeon level.
    #[must_use]
    pub fn boss(level: u32) -> Self {
        let scaled = to_stat(level);
        Self {
            kind: EnemyKind::Boss,
            health: level.saturating_mul(20).saturating_add(100),
            attack: scaled.saturating_mul(3).saturating_add(15),
            defense: scaled.saturating_mul(2).saturating_add(10),
            is_boss: true,
            ..Self::standard()
        }
    }
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self::standard()
    }
}

fn to_stat(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX / 4)
}
