#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates two armies and fights a battle.

mod catalog;

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use grid_battle_core::{BattleEvent, BattleOutcome, Side, BATTLEFIELD_DIMENSIONS};
use grid_battle_system_battle::{self as battle, Battle, Battlefield, FrontLineProgram};
use grid_battle_system_roster::RosterGenerator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

use crate::catalog::Catalog;

/// Simulates a battle between a generated player army and computer army.
#[derive(Parser, Debug)]
#[command(name = "grid-battle")]
#[command(about = "Generate two armies under point budgets and simulate their battle")]
struct Args {
    /// TOML archetype catalog; the built-in catalog is used when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Point budget for the computer army
    #[arg(long, default_value_t = 1500)]
    points: u32,

    /// Point budget for the player army
    #[arg(long, default_value_t = 1500)]
    player_points: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Rounds simulated before the battle is called off
    #[arg(long, default_value_t = 1000)]
    max_rounds: u32,

    /// Wall-clock budget in milliseconds, checked between rounds
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

/// Entry point for the grid battle command-line interface.
fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grid_battle=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let outcome = run(&args)?;
    println!("{}", describe(outcome));
    Ok(())
}

fn run(args: &Args) -> Result<BattleOutcome> {
    let catalog = Catalog::load(args.catalog.as_deref())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, archetypes = catalog.archetypes().len(), "starting battle");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let generator = RosterGenerator::default();
    let player = generator
        .generate(catalog.archetypes(), args.player_points, Side::Player, &mut rng)
        .context("failed to generate player army")?;
    let mut computer = generator
        .generate(catalog.archetypes(), args.points, Side::Computer, &mut rng)
        .context("failed to generate computer army")?;
    computer.mirror_columns(BATTLEFIELD_DIMENSIONS.columns());
    info!(
        player_units = player.units().len(),
        player_points = player.points(),
        computer_units = computer.units().len(),
        computer_points = computer.points(),
        "armies deployed"
    );

    let mut field = Battlefield::new(BATTLEFIELD_DIMENSIONS, player, computer)
        .context("failed to deploy armies onto the battlefield")?;
    let mut program = FrontLineProgram::new(field.dimensions());
    let deadline = args
        .time_limit_ms
        .map(|limit| Instant::now() + Duration::from_millis(limit));
    let mut events = Vec::new();

    let outcome = Battle::new(battle::Config::new(args.max_rounds)).simulate(
        &mut field,
        &mut program,
        || deadline.is_some_and(|deadline| Instant::now() >= deadline),
        &mut events,
    );

    for event in &events {
        log_event(&field, event);
    }
    Ok(outcome)
}

fn log_event(field: &Battlefield, event: &BattleEvent) {
    let name = |id| field.unit(id).map_or("<unknown>", |unit| unit.name());
    match *event {
        BattleEvent::RoundStarted { round } => trace!(round, "round started"),
        BattleEvent::UnitMoved { unit, from, to } => debug!(
            unit = name(unit),
            from = ?from,
            to = ?to,
            "moved"
        ),
        BattleEvent::UnitAttacked {
            attacker,
            target,
            damage,
            remaining_health,
        } => info!(
            attacker = name(attacker),
            target = name(target),
            damage,
            remaining_health,
            "attack"
        ),
        BattleEvent::UnitDefeated { unit } => info!(unit = name(unit), "defeated"),
        BattleEvent::TurnHeld { unit } => debug!(unit = name(unit), "held position"),
    }
}

fn describe(outcome: BattleOutcome) -> String {
    match outcome {
        BattleOutcome::PlayerVictory => "Player army wins".to_owned(),
        BattleOutcome::ComputerVictory => "Computer army wins".to_owned(),
        BattleOutcome::Draw => "Both armies were wiped out".to_owned(),
        BattleOutcome::Interrupted { rounds } => {
            format!("Battle interrupted after {rounds} rounds")
        }
        BattleOutcome::RoundLimitReached { rounds } => {
            format!("No decision after {rounds} rounds")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(seed: u64) -> Args {
        Args::parse_from(["grid-battle", "--seed", &seed.to_string()])
    }

    #[test]
    fn defaults_match_reference_budgets() {
        let args = args(1);

        assert_eq!(args.points, 1500);
        assert_eq!(args.player_points, 1500);
        assert_eq!(args.max_rounds, 1000);
        assert!(args.catalog.is_none());
        assert!(args.time_limit_ms.is_none());
    }

    #[test]
    fn seeded_runs_replay_identically() {
        let first = run(&args(0x5eed)).expect("battle runs");
        let second = run(&args(0x5eed)).expect("battle runs");

        assert_eq!(first, second);
        assert!(!matches!(first, BattleOutcome::Interrupted { .. }));
    }

    #[test]
    fn zero_time_limit_interrupts_before_the_first_round() {
        let mut args = args(3);
        args.time_limit_ms = Some(0);

        assert_eq!(
            run(&args).expect("battle runs"),
            BattleOutcome::Interrupted { rounds: 0 }
        );
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let mut args = args(4);
        args.catalog = Some(PathBuf::from("/nonexistent/catalog.toml"));

        assert!(run(&args).is_err());
    }
}
