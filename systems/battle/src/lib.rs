#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round-based battle loop between the player and computer armies.
//!
//! Each round rebuilds both turn orders from the units still standing, sorted
//! by base attack so the hardest hitters act first. The player army acts
//! before the computer army, and every unit alive when its turn comes hands
//! control to its [`UnitProgram`]. The loop ends when an army has no units
//! left, when the host asks it to stop, or when the round bound is reached.

mod battlefield;
mod program;

use std::cmp::Reverse;

use grid_battle_core::{BattleEvent, BattleOutcome, Side, Unit, UnitId};
use tracing::{info, trace};

pub use battlefield::Battlefield;
pub use program::{FrontLineProgram, UnitProgram};

const DEFAULT_MAX_ROUNDS: u32 = 1_000;

/// Configuration parameters required to construct the battle loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    max_rounds: u32,
}

impl Config {
    /// Creates a configuration that gives up after `max_rounds` full rounds.
    #[must_use]
    pub const fn new(max_rounds: u32) -> Self {
        Self { max_rounds }
    }

    /// Safety bound on the number of rounds simulated.
    #[must_use]
    pub const fn max_rounds(&self) -> u32 {
        self.max_rounds
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROUNDS)
    }
}

/// Pure system that runs a battle to completion.
#[derive(Debug, Default)]
pub struct Battle {
    config: Config,
}

impl Battle {
    /// Creates a battle loop using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Simulates rounds until the battle is decided or stopped.
    ///
    /// `should_stop` is polled once per round boundary, before the round
    /// starts; returning `true` ends the battle as
    /// [`BattleOutcome::Interrupted`]. Events produced by the programs and the
    /// loop itself are appended to `out`.
    pub fn simulate<P, S>(
        &self,
        field: &mut Battlefield,
        program: &mut P,
        mut should_stop: S,
        out: &mut Vec<BattleEvent>,
    ) -> BattleOutcome
    where
        P: UnitProgram + ?Sized,
        S: FnMut() -> bool,
    {
        let mut rounds = 0;

        let outcome = loop {
            let player = turn_order(field, Side::Player);
            let computer = turn_order(field, Side::Computer);

            match (player.is_empty(), computer.is_empty()) {
                (true, true) => break BattleOutcome::Draw,
                (true, false) => break BattleOutcome::ComputerVictory,
                (false, true) => break BattleOutcome::PlayerVictory,
                (false, false) => {}
            }

            if rounds >= self.config.max_rounds {
                break BattleOutcome::RoundLimitReached { rounds };
            }

            if should_stop() {
                break BattleOutcome::Interrupted { rounds };
            }

            rounds += 1;
            out.push(BattleEvent::RoundStarted { round: rounds });
            take_turns(field, program, &player, out);
            take_turns(field, program, &computer, out);
        };

        info!(?outcome, rounds, "battle finished");
        outcome
    }
}

/// Live units of `side`, strongest base attack first; ties keep deployment order.
fn turn_order(field: &Battlefield, side: Side) -> Vec<UnitId> {
    let mut living: Vec<&Unit> = field.living(side).collect();
    living.sort_by_key(|unit| Reverse(unit.base_attack()));
    living.into_iter().map(Unit::id).collect()
}

fn take_turns<P>(
    field: &mut Battlefield,
    program: &mut P,
    order: &[UnitId],
    out: &mut Vec<BattleEvent>,
) where
    P: UnitProgram + ?Sized,
{
    for &unit in order {
        if !field.unit(unit).is_some_and(Unit::is_alive) {
            trace!(?unit, "fell earlier this round, skipping turn");
            continue;
        }

        let target = program.attack(unit, field, out);
        trace!(?unit, ?target, "turn played");
    }
}
