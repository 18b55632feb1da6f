use monster_dungeon_core::{
    CellCoord, Command, Direction, EnemyId, EnemyTemplate, Event, MoveRejection, RemovalCause,
    PLAYER_START,
};
use monster_dungeon_system_spawning::{Config, Roster, Spawning};
use monster_dungeon_system_turns::{MoveCheck, TurnOutcome, TurnSequencer};
use monster_dungeon_world::{self as world, query, World};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn setup(start: CellCoord) -> (World, TurnSequencer, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartEncounter {
            player_start: start,
        },
        &mut events,
    );
    // Zero lanes keeps the spawn policy from adding enemies of its own.
    let spawning = Spawning::new(Config::new(0, Roster::Standard), &mut rng);
    (world, TurnSequencer::new(spawning), rng)
}

fn place(world: &mut World, column: u32, template: EnemyTemplate) {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnEnemy { column, template }, &mut events);
}

#[test]
fn enemy_descends_into_player_then_passes() {
    let (mut world, mut turns, mut rng) = setup(PLAYER_START);
    place(&mut world, 4, EnemyTemplate::standard());

    for turn in 1..=7 {
        let report = turns.advance(&mut world, &mut rng, &mut Vec::new());
        assert_eq!(report.turn, turn);
        assert_eq!(report.contacts, 0);
        let enemy = query::enemy_view(&world).into_vec();
        assert_eq!(enemy[0].cell, CellCoord::new(4, u32::try_from(turn).unwrap()));
    }

    let contact = turns.advance(&mut world, &mut rng, &mut Vec::new());
    assert_eq!(contact.contacts, 1);
    assert!((1..=2).contains(&contact.damage_taken));
    let player = query::player(&world).expect("player present");
    assert_eq!(player.health, 100 - contact.damage_taken);
    assert_eq!(
        query::enemy_at(&world, PLAYER_START).map(|enemy| enemy.id),
        Some(EnemyId::new(0))
    );

    let mut events = Vec::new();
    let passed = turns.advance(&mut world, &mut rng, &mut events);
    assert_eq!(passed.passed, 1);
    assert_eq!(passed.contacts, 0);
    assert!(events.contains(&Event::EnemyRemoved {
        index: 0,
        enemy: EnemyId::new(0),
        cause: RemovalCause::PassedPlayer,
    }));
    assert!(query::enemy_view(&world).is_empty());
    assert_eq!(
        query::occupancy_view(&world).occupant(PLAYER_START),
        Some(monster_dungeon_core::Occupant::Player)
    );
}

#[test]
fn blocks_descend_without_dealing_damage() {
    let (mut world, mut turns, mut rng) = setup(PLAYER_START);
    place(&mut world, 4, EnemyTemplate::block(0));

    let mut damage = 0;
    for _ in 0..9 {
        damage += turns
            .advance(&mut world, &mut rng, &mut Vec::new())
            .damage_taken;
    }

    assert_eq!(damage, 0);
    assert_eq!(query::player(&world).map(|player| player.health), Some(100));
}

#[test]
fn rejected_step_skips_the_turn() {
    let (mut world, mut turns, mut rng) = setup(CellCoord::new(0, 8));
    place(&mut world, 0, EnemyTemplate::standard());

    let mut events = Vec::new();
    let outcome = turns.play_turn(&mut world, Direction::Left, &mut rng, &mut events);

    assert_eq!(outcome, TurnOutcome::Rejected(MoveRejection::OutOfBounds));
    assert_eq!(query::turn(&world), 0);
    assert_eq!(
        query::enemy_view(&world).into_vec()[0].cell,
        CellCoord::new(0, 0)
    );
    assert_eq!(
        events,
        vec![Event::PlayerMoveRejected {
            direction: Direction::Left,
            reason: MoveRejection::OutOfBounds,
        }]
    );
}

#[test]
fn accepted_step_runs_the_rest_of_the_turn() {
    let (mut world, mut turns, mut rng) = setup(PLAYER_START);
    place(&mut world, 1, EnemyTemplate::standard());

    let mut events = Vec::new();
    let outcome = turns.play_turn(&mut world, Direction::Right, &mut rng, &mut events);

    match outcome {
        TurnOutcome::Completed(report) => assert_eq!(report.turn, 1),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        events.first(),
        Some(&Event::PlayerMoved {
            from: PLAYER_START,
            to: CellCoord::new(5, 8),
        })
    );
    assert_eq!(
        query::enemy_view(&world).into_vec()[0].cell,
        CellCoord::new(1, 1)
    );
}

#[test]
fn enemy_in_player_row_blocks_sideways_step() {
    let (mut world, turns, mut rng) = setup(CellCoord::new(3, 2));
    place(&mut world, 4, EnemyTemplate::standard());
    let mut sequencer = turns;
    let _ = sequencer.advance(&mut world, &mut rng, &mut Vec::new());
    let _ = sequencer.advance(&mut world, &mut rng, &mut Vec::new());

    let check = sequencer.validate_move(&mut world, Direction::Right, &mut Vec::new());

    assert_eq!(check, MoveCheck::Rejected(MoveRejection::Occupied));
    assert_eq!(
        query::player(&world).map(|player| player.cell),
        Some(CellCoord::new(3, 2))
    );
}

#[test]
fn spawn_policy_adds_enemies_over_time() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartEncounter {
            player_start: PLAYER_START,
        },
        &mut events,
    );
    let spawning = Spawning::new(Config::default(), &mut rng);
    let mut turns = TurnSequencer::new(spawning);

    let spawned: usize = (0..3)
        .map(|_| turns.advance(&mut world, &mut rng, &mut Vec::new()).spawned)
        .sum();

    assert!(spawned >= 1, "a threshold of at most three must trigger");
    assert!(query::enemy_view(&world)
        .iter()
        .all(|enemy| enemy.cell.row() <= 2));
}

proptest! {
    #[test]
    fn reported_damage_matches_health_lost(seed in any::<u64>(), count in 1usize..40) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::StartEncounter {
                player_start: CellCoord::new(4, 2),
            },
            &mut events,
        );
        let mut turns = TurnSequencer::new(Spawning::new(Config::default(), &mut rng));

        let mut total = 0;
        for _ in 0..count {
            let report = turns.advance(&mut world, &mut rng, &mut events);
            prop_assert!(report.contacts <= 1);
            total += report.damage_taken;
        }

        let health = query::player(&world).map_or(0, |player| player.health);
        prop_assert_eq!(health, 100 - total);
    }
}

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(9);
    let second = replay(9);

    assert_eq!(first, second, "replay diverged between runs");
}

fn replay(seed: u64) -> Vec<Event> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut world = World::new();
    let mut log = Vec::new();
    world::apply(
        &mut world,
        Command::StartEncounter {
            player_start: PLAYER_START,
        },
        &mut log,
    );
    let mut turns = TurnSequencer::new(Spawning::new(Config::default(), &mut rng));

    let script = [
        Direction::Left,
        Direction::Left,
        Direction::Right,
        Direction::Right,
        Direction::Right,
        Direction::Left,
    ];
    for direction in script.iter().cycle().take(30) {
        let _ = turns.play_turn(&mut world, *direction, &mut rng, &mut log);
    }
    log
}
