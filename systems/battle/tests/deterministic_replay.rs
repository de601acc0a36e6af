use grid_battle_core::{
    Archetype, AttackType, BattleEvent, BattleOutcome, BonusTable, Side, BATTLEFIELD_DIMENSIONS,
};
use grid_battle_system_battle::{Battle, Battlefield, FrontLineProgram};
use grid_battle_system_roster::RosterGenerator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, PartialEq)]
struct Replay {
    outcome: BattleOutcome,
    events: Vec<BattleEvent>,
    survivors: Vec<(String, u32)>,
}

fn catalog() -> Vec<Archetype> {
    vec![
        Archetype {
            name: "Archer".to_owned(),
            health: 50,
            base_attack: 30,
            cost: 80,
            attack_type: AttackType::Ranged,
            attack_bonuses: BonusTable::from_pairs([("Pikeman", 1.5)]),
            defence_bonuses: BonusTable::default(),
        },
        Archetype {
            name: "Knight".to_owned(),
            health: 60,
            base_attack: 40,
            cost: 100,
            attack_type: AttackType::Melee,
            attack_bonuses: BonusTable::from_pairs([("Archer", 2.0)]),
            defence_bonuses: BonusTable::from_pairs([("Archer", 1.5)]),
        },
        Archetype {
            name: "Pikeman".to_owned(),
            health: 45,
            base_attack: 20,
            cost: 60,
            attack_type: AttackType::Melee,
            attack_bonuses: BonusTable::from_pairs([("Knight", 2.0)]),
            defence_bonuses: BonusTable::default(),
        },
    ]
}

fn replay(seed: u64, player_points: u32, computer_points: u32) -> Replay {
    let generator = RosterGenerator::default();
    let catalog = catalog();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let player = generator
        .generate(&catalog, player_points, Side::Player, &mut rng)
        .expect("player roster");
    let mut computer = generator
        .generate(&catalog, computer_points, Side::Computer, &mut rng)
        .expect("computer roster");
    computer.mirror_columns(BATTLEFIELD_DIMENSIONS.columns());

    let mut field =
        Battlefield::new(BATTLEFIELD_DIMENSIONS, player, computer).expect("valid deployment");
    let mut program = FrontLineProgram::new(field.dimensions());
    let mut events = Vec::new();

    let outcome = Battle::default().simulate(&mut field, &mut program, || false, &mut events);
    let survivors = field
        .units()
        .iter()
        .filter(|unit| unit.is_alive())
        .map(|unit| (unit.name().to_owned(), unit.health()))
        .collect();

    Replay {
        outcome,
        events,
        survivors,
    }
}

#[test]
fn deterministic_replay_of_seeded_battle() {
    let first = replay(0x0ba7_71e5, 1_500, 1_500);
    let second = replay(0x0ba7_71e5, 1_500, 1_500);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, BattleEvent::UnitDefeated { .. })));
}

#[test]
fn generated_battles_reach_a_decision() {
    for seed in 0..8 {
        let replay = replay(seed, 1_500, 1_500);

        assert!(
            matches!(
                replay.outcome,
                BattleOutcome::PlayerVictory | BattleOutcome::ComputerVictory | BattleOutcome::Draw
            ),
            "seed {seed} ended with {:?}",
            replay.outcome
        );
    }
}

#[test]
fn winner_is_the_only_army_left_standing() {
    let replay = replay(3, 1_500, 300);

    let winner = match replay.outcome {
        BattleOutcome::PlayerVictory => Side::Player,
        BattleOutcome::ComputerVictory => Side::Computer,
        other => panic!("battle ended without a winner: {other:?}"),
    };
    let defeated = replay
        .events
        .iter()
        .filter(|event| {
            matches!(event, BattleEvent::UnitDefeated { unit } if unit.side() != winner)
        })
        .count();

    assert!(defeated > 0);
    assert!(!replay.survivors.is_empty());
}

#[test]
fn rounds_are_numbered_consecutively() {
    let replay = replay(11, 900, 900);

    let rounds: Vec<u32> = replay
        .events
        .iter()
        .filter_map(|event| match event {
            BattleEvent::RoundStarted { round } => Some(*round),
            _ => None,
        })
        .collect();

    assert!(!rounds.is_empty());
    assert!(rounds
        .iter()
        .enumerate()
        .all(|(index, &round)| round as usize == index + 1));
}
