//! Authoritative unit state for a single battle.

use std::collections::{HashMap, HashSet};

use grid_battle_core::{CellCoord, ConfigError, GridDimensions, Roster, Side, Unit, UnitId};
use grid_battle_system_targeting::rows_by_row;

/// Every unit of both armies, live and dead, placed on one grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Battlefield {
    dimensions: GridDimensions,
    units: Vec<Unit>,
}

impl Battlefield {
    /// Deploys both rosters onto a grid of the provided dimensions.
    ///
    /// # Errors
    ///
    /// Rejects units standing outside the grid, identifiers used twice, units
    /// whose identifier names the other army, and live units sharing a cell.
    pub fn new(
        dimensions: GridDimensions,
        player: Roster,
        computer: Roster,
    ) -> Result<Self, ConfigError> {
        let deployment = player
            .into_units()
            .into_iter()
            .map(|unit| (Side::Player, unit))
            .chain(computer.into_units().into_iter().map(|unit| (Side::Computer, unit)));

        let mut units = Vec::new();
        let mut seen = HashSet::new();
        let mut occupied: HashMap<CellCoord, UnitId> = HashMap::new();
        for (expected, unit) in deployment {
            if unit.side() != expected {
                return Err(ConfigError::SideMismatch {
                    unit: unit.id(),
                    expected,
                });
            }

            if !dimensions.contains(unit.cell()) {
                return Err(ConfigError::UnitOutOfBounds {
                    unit: unit.id(),
                    cell: unit.cell(),
                });
            }

            if !seen.insert(unit.id()) {
                return Err(ConfigError::DuplicateUnit { unit: unit.id() });
            }

            if unit.is_alive() {
                if let Some(&occupant) = occupied.get(&unit.cell()) {
                    return Err(ConfigError::CellOccupied {
                        unit: unit.id(),
                        cell: unit.cell(),
                        occupant,
                    });
                }
                let _ = occupied.insert(unit.cell(), unit.id());
            }

            units.push(unit);
        }

        Ok(Self { dimensions, units })
    }

    /// Grid the battle is fought on.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// All units, player army first, in deployment order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id() == id)
    }

    /// Looks up a unit by identifier for mutation.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id() == id)
    }

    /// Live units fighting for `side`.
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |unit| unit.side() == side && unit.is_alive())
    }

    /// Units of `side` grouped into rows indexed by column.
    #[must_use]
    pub fn rows(&self, side: Side) -> Vec<Vec<Option<&Unit>>> {
        rows_by_row(
            self.units.iter().filter(|unit| unit.side() == side),
            self.dimensions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_battle_core::{Archetype, AttackType, BonusTable, CellCoord};

    fn roster(side: Side, cells: &[(u32, u32)]) -> Roster {
        let archetype = Archetype {
            name: "Swordsman".to_owned(),
            health: 20,
            base_attack: 5,
            cost: 10,
            attack_type: AttackType::Melee,
            attack_bonuses: BonusTable::default(),
            defence_bonuses: BonusTable::default(),
        };
        let mut roster = Roster::default();
        for (ordinal, &(column, row)) in cells.iter().enumerate() {
            roster.push(Unit::from_archetype(
                UnitId::new(side, ordinal as u32),
                "Swordsman",
                &archetype,
                CellCoord::new(column, row),
            ));
        }
        roster
    }

    fn grid() -> GridDimensions {
        GridDimensions::new(5, 3).expect("valid grid")
    }

    #[test]
    fn deploys_both_armies() {
        let field = Battlefield::new(
            grid(),
            roster(Side::Player, &[(0, 0), (0, 1)]),
            roster(Side::Computer, &[(4, 2)]),
        )
        .expect("valid deployment");

        assert_eq!(field.units().len(), 3);
        assert_eq!(field.living(Side::Player).count(), 2);
        assert_eq!(field.living(Side::Computer).count(), 1);
        assert_eq!(
            field.rows(Side::Computer)[2][4].map(Unit::id),
            Some(UnitId::new(Side::Computer, 0))
        );
    }

    #[test]
    fn rejects_units_outside_the_grid() {
        let result = Battlefield::new(
            grid(),
            roster(Side::Player, &[(0, 0)]),
            roster(Side::Computer, &[(5, 0)]),
        );

        assert_eq!(
            result,
            Err(ConfigError::UnitOutOfBounds {
                unit: UnitId::new(Side::Computer, 0),
                cell: CellCoord::new(5, 0),
            })
        );
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let mut player = roster(Side::Player, &[(0, 0)]);
        player.push(roster(Side::Player, &[(1, 0)]).into_units().remove(0));

        let result = Battlefield::new(grid(), player, roster(Side::Computer, &[(4, 0)]));

        assert_eq!(
            result,
            Err(ConfigError::DuplicateUnit {
                unit: UnitId::new(Side::Player, 0),
            })
        );
    }

    #[test]
    fn rejects_units_handed_to_the_wrong_army() {
        let result = Battlefield::new(
            grid(),
            roster(Side::Player, &[(0, 0)]),
            roster(Side::Player, &[(4, 0)]),
        );

        assert_eq!(
            result,
            Err(ConfigError::SideMismatch {
                unit: UnitId::new(Side::Player, 0),
                expected: Side::Computer,
            })
        );
    }

    #[test]
    fn rejects_live_units_sharing_a_cell() {
        let result = Battlefield::new(
            grid(),
            roster(Side::Player, &[(0, 1)]),
            roster(Side::Computer, &[(4, 1), (4, 1)]),
        );

        assert_eq!(
            result,
            Err(ConfigError::CellOccupied {
                unit: UnitId::new(Side::Computer, 1),
                cell: CellCoord::new(4, 1),
                occupant: UnitId::new(Side::Computer, 0),
            })
        );
    }

    #[test]
    fn fallen_units_may_lie_under_live_ones() {
        let mut computer = roster(Side::Computer, &[(4, 1), (4, 1)]);
        let _ = computer.units_mut()[0].take_damage(100);

        let field = Battlefield::new(grid(), roster(Side::Player, &[(0, 1)]), computer)
            .expect("fallen units do not hold cells");

        assert_eq!(field.living(Side::Computer).count(), 1);
    }

    #[test]
    fn dead_units_are_not_living() {
        let mut field = Battlefield::new(
            grid(),
            roster(Side::Player, &[(0, 0)]),
            roster(Side::Computer, &[(4, 0)]),
        )
        .expect("valid deployment");

        let id = UnitId::new(Side::Computer, 0);
        let _ = field.unit_mut(id).expect("unit").take_damage(100);

        assert_eq!(field.living(Side::Computer).count(), 0);
        assert!(field.unit(id).is_some());
    }
}
