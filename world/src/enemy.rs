//! Enemy records held by the world roster.

use monster_dungeon_core::{
    mitigated_damage, CellCoord, EnemyId, EnemyKind, EnemySnapshot, EnemyTemplate,
};

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) cell: CellCoord,
    kind: EnemyKind,
    health: u32,
    max_health: u32,
    attack: i32,
    defense: i32,
    pub(crate) is_block: bool,
    is_boss: bool,
    pub(crate) gold_reward: u32,
    pub(crate) experience_reward: u32,
}

impl Enemy {
    pub(crate) fn spawn(id: EnemyId, cell: CellCoord, template: EnemyTemplate) -> Self {
        Self {
            id,
            cell,
            kind: template.kind,
            health: template.health,
            max_health: template.health,
            attack: template.attack,
            defense: template.defense,
            is_block: template.is_block,
            is_boss: template.is_boss,
            gold_reward: template.gold_reward,
            experience_reward: template.experience_reward,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Applies mitigated damage and returns the health actually lost.
    pub(crate) fn take_damage(&mut self, raw: i32) -> u32 {
        let lost = mitigated_damage(raw, self.defense).min(self.health);
        self.health -= lost;
        lost
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            cell: self.cell,
            kind: self.kind,
            health: self.health,
            max_health: self.max_health,
            attack: self.attack,
            defense: self.defense,
            is_block: self.is_block,
            is_boss: self.is_boss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_copies_template() {
        let enemy = Enemy::spawn(
            EnemyId::new(3),
            CellCoord::new(2, 0),
            EnemyTemplate::standard(),
        );
        let snapshot = enemy.snapshot();

        assert_eq!(snapshot.health, 30);
        assert_eq!(snapshot.max_health, 30);
        assert_eq!(snapshot.attack, 5);
        assert_eq!(snapshot.defense, 2);
        assert_eq!(enemy.gold_reward, 10);
        assert_eq!(enemy.experience_reward, 25);
    }

    #[test]
    fn lethal_damage_clamps_at_zero() {
        let mut enemy = Enemy::spawn(
            EnemyId::new(0),
            CellCoord::new(0, 0),
            EnemyTemplate::standard(),
        );

        assert_eq!(enemy.take_damage(100), 30);
        assert_eq!(enemy.health(), 0);
        assert!(!enemy.is_alive());
    }

    #[test]
    fn blocks_still_take_one_point() {
        let mut block = Enemy::spawn(
            EnemyId::new(0),
            CellCoord::new(0, 0),
            EnemyTemplate::block(0),
        );

        assert_eq!(block.take_damage(12), 1);
        assert_eq!(block.health(), 49);
    }
}
