//! Per-unit attack behaviour invoked once per turn by the battle loop.

use grid_battle_core::{AttackType, BattleEvent, GridDimensions, Unit, UnitId};
use grid_battle_system_pathfinding::Pathfinder;
use grid_battle_system_targeting::{suitable_targets, Approach};
use tracing::trace;

use crate::Battlefield;

/// Decides whom a unit attacks on its turn and resolves the strike.
///
/// Implementations own target selection, movement and damage. The battle loop
/// only guarantees that `attacker` is alive when the turn starts.
pub trait UnitProgram {
    /// Plays `attacker`'s turn, returning the unit it attacked, if any.
    fn attack(
        &mut self,
        attacker: UnitId,
        field: &mut Battlefield,
        out: &mut Vec<BattleEvent>,
    ) -> Option<UnitId>;
}

impl<F> UnitProgram for F
where
    F: FnMut(UnitId, &mut Battlefield, &mut Vec<BattleEvent>) -> Option<UnitId>,
{
    fn attack(
        &mut self,
        attacker: UnitId,
        field: &mut Battlefield,
        out: &mut Vec<BattleEvent>,
    ) -> Option<UnitId> {
        self(attacker, field, out)
    }
}

/// Reference behaviour: strike the weakest exposed enemy.
///
/// Candidates come from the front-line rule, ranked by least health with the
/// lowest identifier first on ties. Ranged attackers strike the first
/// candidate from where they stand. Melee attackers take the first candidate
/// they can reach, walk the shortest route until they stand next to it, and
/// hold their position when no candidate is reachable.
#[derive(Debug)]
pub struct FrontLineProgram {
    pathfinder: Pathfinder,
}

impl FrontLineProgram {
    /// Creates the behaviour for a battlefield of the provided dimensions.
    #[must_use]
    pub fn new(dimensions: GridDimensions) -> Self {
        Self {
            pathfinder: Pathfinder::new(dimensions),
        }
    }

    /// Exposed enemies of `attacker`, weakest first.
    fn candidates(field: &Battlefield, attacker: &Unit) -> Vec<UnitId> {
        let defender = attacker.side().opponent();
        let rows = field.rows(defender);
        let mut exposed = suitable_targets(&rows, Approach::against(defender));
        exposed.sort_by_key(|unit| (unit.health(), unit.id()));
        exposed.into_iter().map(Unit::id).collect()
    }

    /// Moves a melee attacker next to the first candidate it can reach and
    /// returns that candidate, or `None` when every candidate is cut off.
    fn approach(
        &mut self,
        field: &mut Battlefield,
        attacker: UnitId,
        candidates: &[UnitId],
        out: &mut Vec<BattleEvent>,
    ) -> Option<UnitId> {
        let attacker_unit = field.unit(attacker)?;
        let from = attacker_unit.cell();
        let pathfinder = &mut self.pathfinder;
        let (target, route) = candidates.iter().find_map(|&candidate| {
            let target_unit = field.unit(candidate)?;
            let route = pathfinder.find_path(attacker_unit, target_unit, field.units());
            (!route.is_empty()).then_some((candidate, route))
        })?;

        if candidates.first() != Some(&target) {
            trace!(?attacker, ?target, "weakest target unreachable, engaging next");
        }

        // The last cell is the target's own; stop one short of it.
        if let Some(&destination) = route.len().checked_sub(2).and_then(|index| route.get(index)) {
            if let Some(unit) = field.unit_mut(attacker) {
                unit.move_to(destination);
                out.push(BattleEvent::UnitMoved {
                    unit: attacker,
                    from,
                    to: destination,
                });
            }
        }

        Some(target)
    }
}

impl UnitProgram for FrontLineProgram {
    fn attack(
        &mut self,
        attacker: UnitId,
        field: &mut Battlefield,
        out: &mut Vec<BattleEvent>,
    ) -> Option<UnitId> {
        let attacker_unit = field.unit(attacker).filter(|unit| unit.is_alive())?;
        let attack_type = attacker_unit.attack_type();

        let candidates = Self::candidates(field, attacker_unit);
        let Some(&weakest) = candidates.first() else {
            trace!(?attacker, "no exposed targets");
            out.push(BattleEvent::TurnHeld { unit: attacker });
            return None;
        };

        let target = match attack_type {
            AttackType::Ranged => weakest,
            AttackType::Melee => {
                let Some(target) = self.approach(field, attacker, &candidates, out) else {
                    trace!(?attacker, "no reachable targets, holding position");
                    out.push(BattleEvent::TurnHeld { unit: attacker });
                    return None;
                };
                target
            }
        };

        let damage = strike_damage(field.unit(attacker)?, field.unit(target)?);
        let remaining_health = field.unit_mut(target)?.take_damage(damage);
        out.push(BattleEvent::UnitAttacked {
            attacker,
            target,
            damage,
            remaining_health,
        });
        if remaining_health == 0 {
            out.push(BattleEvent::UnitDefeated { unit: target });
        }

        Some(target)
    }
}

/// Base attack scaled by the attacker's bonus against the target's archetype
/// and divided by the target's bonus against the attacker's. Never below one.
fn strike_damage(attacker: &Unit, target: &Unit) -> u32 {
    let multiplier = attacker.attack_bonuses().multiplier(target.archetype());
    let resistance = target.defence_bonuses().multiplier(attacker.archetype());
    let resistance = if resistance > 0.0 { resistance } else { 1.0 };

    let raw = (f64::from(attacker.base_attack()) * multiplier / resistance).round();
    if raw.is_nan() || raw < 1.0 {
        1
    } else if raw >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        raw as u32
    }
}
