//! Player character state and equipment.

use monster_dungeon_core::{mitigated_damage, CellCoord, Item, ItemKind, PlayerSnapshot};

const STARTING_HEALTH: u32 = 100;
const STARTING_ATTACK: i32 = 10;
const STARTING_DEFENSE: i32 = 5;
const EXPERIENCE_PER_LEVEL: u32 = 100;
const MAX_LEVEL: u32 = 99;

/// Maximum number of items the pack can hold.
pub(crate) const PACK_CAPACITY: usize = 20;

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) cell: CellCoord,
    health: u32,
    max_health: u32,
    attack: i32,
    defense: i32,
    level: u32,
    experience: u32,
    gold: u32,
    inventory: Inventory,
}

impl Player {
    pub(crate) fn new(cell: CellCoord) -> Self {
        Self {
            cell,
            health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            attack: STARTING_ATTACK,
            defense: STARTING_DEFENSE,
            level: 1,
            experience: 0,
            gold: 0,
            inventory: Inventory::default(),
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Attack dealt by melee strikes, including the weapon bonus.
    pub(crate) fn strike_damage(&self) -> i32 {
        self.attack.saturating_add(self.inventory.attack_bonus())
    }

    /// Applies mitigated damage and returns the health actually lost.
    pub(crate) fn take_damage(&mut self, raw: i32) -> u32 {
        let defense = self.defense.saturating_add(self.inventory.defense_bonus());
        let lost = mitigated_damage(raw, defense).min(self.health);
        self.health -= lost;
        lost
    }

    /// Restores health up to the maximum and returns the amount restored.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_health - self.health);
        self.health += restored;
        restored
    }

    /// Adds spoils and returns every level reached along the way.
    pub(crate) fn collect_reward(&mut self, gold: u32, experience: u32) -> Vec<u32> {
        self.gold = self.gold.saturating_add(gold);
        self.gain_experience(experience)
    }

    fn gain_experience(&mut self, experience: u32) -> Vec<u32> {
        self.experience = self.experience.saturating_add(experience);

        let mut reached = Vec::new();
        while self.level < MAX_LEVEL
            && self.experience >= self.level.saturating_mul(EXPERIENCE_PER_LEVEL)
        {
            self.level_up();
            reached.push(self.level);
        }
        reached
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.max_health = self.max_health.saturating_add(10);
        self.health = self.max_health;
        self.attack = self.attack.saturating_add(2);
        self.defense = self.defense.saturating_add(1);
    }

    pub(crate) fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub(crate) fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: self.cell,
            health: self.health,
            max_health: self.max_health,
            attack: self.attack,
            defense: self.defense,
            attack_bonus: self.inventory.attack_bonus(),
            defense_bonus: self.inventory.defense_bonus(),
            level: self.level,
            experience: self.experience,
            gold: self.gold,
        }
    }
}

/// Carried items plus the equipped weapon and armor.
#[derive(Clone, Debug, Default)]
pub(crate) struct Inventory {
    pack: Vec<Item>,
    weapon: Option<Item>,
    armor: Option<Item>,
}

impl Inventory {
    /// Equips weapons and armor, stowing whatever they replace; stows
    /// anything else. Items that do not fit in the pack are dropped.
    pub(crate) fn receive(&mut self, item: Item) {
        let displaced = match item.kind {
            ItemKind::Weapon => self.weapon.replace(item),
            ItemKind::Armor => self.armor.replace(item),
            _ => Some(item),
        };

        if let Some(item) = displaced {
            if self.pack.len() < PACK_CAPACITY {
                self.pack.push(item);
            }
        }
    }

    pub(crate) fn attack_bonus(&self) -> i32 {
        self.weapon.as_ref().map_or(0, |weapon| weapon.attack_bonus)
    }

    pub(crate) fn defense_bonus(&self) -> i32 {
        self.armor.as_ref().map_or(0, |armor| armor.defense_bonus)
    }

    pub(crate) fn carried(&self) -> usize {
        self.pack.len()
    }
}
