//! Plain-text rendering of the encounter board.

use std::fmt::Write as _;

use monster_dungeon_core::{CellCoord, EnemyView, PlayerSnapshot, ProjectileView};

const EMPTY: char = '.';
const PLAYER: char = '@';
const PROJECTILE: char = '|';

/// Draws the board top row first, followed by a status line.
///
/// Enemies sharing the player's cell are drawn in place of the player.
pub(crate) fn board(
    dimensions: (u32, u32),
    player: Option<&PlayerSnapshot>,
    enemies: &EnemyView,
    projectiles: &ProjectileView,
) -> String {
    let (columns, rows) = dimensions;
    let mut output = String::new();

    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            output.push(glyph(cell, player, enemies, projectiles));
        }
        output.push('\n');
    }

    match player {
        Some(player) => {
            let _ = write!(
                output,
                "HP {}/{}  LV {}  XP {}  GOLD {}  ATK {}+{}  DEF {}+{}",
                player.health,
                player.max_health,
                player.level,
                player.experience,
                player.gold,
                player.attack,
                player.attack_bonus,
                player.defense,
                player.defense_bonus,
            );
        }
        None => output.push_str("no encounter"),
    }
    output
}

fn glyph(
    cell: CellCoord,
    player: Option<&PlayerSnapshot>,
    enemies: &EnemyView,
    projectiles: &ProjectileView,
) -> char {
    if let Some(enemy) = enemies.live_at(cell) {
        return enemy.kind.glyph();
    }
    if player.is_some_and(|player| player.cell == cell) {
        return PLAYER;
    }
    if projectiles.iter().any(|projectile| projectile.cell == cell) {
        return PROJECTILE;
    }
    EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use monster_dungeon_core::{EnemyId, EnemyKind, EnemySnapshot, ProjectileId, ProjectileSnapshot};

    fn player(cell: CellCoord) -> PlayerSnapshot {
        PlayerSnapshot {
            cell,
            health: 90,
            max_health: 100,
            attack: 10,
            defense: 5,
            attack_bonus: 2,
            defense_bonus: 0,
            level: 1,
            experience: 25,
            gold: 10,
        }
    }

    #[test]
    fn draws_player_enemy_and_projectile() {
        let enemies = EnemyView::from_snapshots(vec![EnemySnapshot {
            id: EnemyId::new(0),
            cell: CellCoord::new(0, 0),
            kind: EnemyKind::Orc,
            health: 10,
            max_health: 10,
            attack: 1,
            defense: 1,
            is_block: false,
            is_boss: false,
        }]);
        let projectiles = ProjectileView::from_snapshots(vec![ProjectileSnapshot {
            id: ProjectileId::new(0),
            cell: CellCoord::new(2, 1),
            offset: 1.5,
            damage: 10,
        }]);
        let player = player(CellCoord::new(1, 2));

        let drawn = board((3, 3), Some(&player), &enemies, &projectiles);

        assert_eq!(
            drawn,
            "o..\n..|\n.@.\nHP 90/100  LV 1  XP 25  GOLD 10  ATK 10+2  DEF 5+0"
        );
    }

    #[test]
    fn empty_board_without_player() {
        let drawn = board((2, 1), None, &EnemyView::default(), &ProjectileView::default());
        assert_eq!(drawn, "..\nno encounter");
    }
}
