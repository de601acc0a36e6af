#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides which defending units are exposed to attack.
//!
//! Only the front line can be attacked: within each row, the first live unit
//! seen from the edge the attacker approaches from shields everything behind it.

use grid_battle_core::{GridDimensions, Side, Unit};

/// Edge of the battlefield an attack comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Approach {
    /// Attackers come from low column indices.
    FromLeft,
    /// Attackers come from high column indices.
    FromRight,
}

impl Approach {
    /// Converts an "attack from the left" flag into an approach.
    #[must_use]
    pub const fn from_left(attack_from_left: bool) -> Self {
        if attack_from_left {
            Self::FromLeft
        } else {
            Self::FromRight
        }
    }

    /// Approach used when attacking the army deployed for `defender`.
    ///
    /// The player army holds the left edge, so it is attacked from the right.
    #[must_use]
    pub const fn against(defender: Side) -> Self {
        match defender {
            Side::Player => Self::FromRight,
            Side::Computer => Self::FromLeft,
        }
    }
}

/// Returns the front-line unit of every row, in row order.
///
/// Each row lists cells from the lowest column to the highest; `None` marks an
/// empty slot. Dead units and empty slots never shield the units behind them.
/// Rows without a live unit contribute nothing.
#[must_use]
pub fn suitable_targets<'a>(rows: &[Vec<Option<&'a Unit>>], approach: Approach) -> Vec<&'a Unit> {
    rows.iter()
        .filter_map(|row| front_line(row, approach))
        .collect()
}

fn front_line<'a>(row: &[Option<&'a Unit>], approach: Approach) -> Option<&'a Unit> {
    let mut occupants = row.iter().flatten().copied();
    match approach {
        Approach::FromLeft => occupants.find(|unit| unit.is_alive()),
        Approach::FromRight => occupants.rev().find(|unit| unit.is_alive()),
    }
}

/// Groups units into rows indexed by column, ready for [`suitable_targets`].
///
/// The result has one row per grid row, each as wide as the grid. When a live
/// and a dead unit share a cell the live one occupies the slot. Units outside
/// the grid are ignored.
#[must_use]
pub fn rows_by_row<'a, I>(units: I, dimensions: GridDimensions) -> Vec<Vec<Option<&'a Unit>>>
where
    I: IntoIterator<Item = &'a Unit>,
{
    let columns = dimensions.columns() as usize;
    let mut rows: Vec<Vec<Option<&'a Unit>>> =
        vec![vec![None; columns]; dimensions.rows() as usize];

    for unit in units {
        let cell = unit.cell();
        if !dimensions.contains(cell) {
            continue;
        }

        let slot = &mut rows[cell.row() as usize][cell.column() as usize];
        let keep_existing = slot.is_some_and(|existing| existing.is_alive() || !unit.is_alive());
        if !keep_existing {
            *slot = Some(unit);
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_battle_core::{Archetype, AttackType, BonusTable, CellCoord, UnitId};

    fn unit(ordinal: u32, cell: (u32, u32), health: u32) -> Unit {
        let archetype = Archetype {
            name: "Archer".to_owned(),
            health,
            base_attack: 8,
            cost: 12,
            attack_type: AttackType::Ranged,
            attack_bonuses: BonusTable::default(),
            defence_bonuses: BonusTable::default(),
        };
        Unit::from_archetype(
            UnitId::new(Side::Computer, ordinal),
            format!("Archer {ordinal}"),
            &archetype,
            CellCoord::new(cell.0, cell.1),
        )
    }

    fn ids(units: &[&Unit]) -> Vec<u32> {
        units.iter().map(|unit| unit.id().ordinal()).collect()
    }

    #[test]
    fn only_the_unit_facing_the_attacker_qualifies() {
        let a = unit(1, (0, 0), 10);
        let b = unit(2, (2, 0), 10);
        let rows = vec![vec![Some(&a), None, Some(&b)]];

        assert_eq!(ids(&suitable_targets(&rows, Approach::from_left(true))), vec![1]);
        assert_eq!(ids(&suitable_targets(&rows, Approach::from_left(false))), vec![2]);
    }

    #[test]
    fn dead_units_do_not_shield() {
        let fallen = unit(1, (0, 0), 0);
        let middle = unit(2, (1, 0), 10);
        let back = unit(3, (2, 0), 10);
        let rows = vec![vec![Some(&fallen), Some(&middle), Some(&back)]];

        assert_eq!(ids(&suitable_targets(&rows, Approach::FromLeft)), vec![2]);
        assert_eq!(ids(&suitable_targets(&rows, Approach::FromRight)), vec![3]);
    }

    #[test]
    fn rows_without_live_units_contribute_nothing() {
        let fallen = unit(1, (0, 0), 0);
        let standing = unit(2, (1, 1), 10);
        let rows = vec![
            vec![Some(&fallen), None, None],
            vec![None, None, None],
            vec![None, Some(&standing), None],
        ];

        assert_eq!(ids(&suitable_targets(&rows, Approach::FromLeft)), vec![2]);
        assert!(suitable_targets(&[], Approach::FromLeft).is_empty());
    }

    #[test]
    fn targets_follow_row_order() {
        let first = unit(7, (2, 0), 10);
        let second = unit(3, (1, 1), 10);
        let rows = vec![vec![None, None, Some(&first)], vec![None, Some(&second), None]];

        assert_eq!(ids(&suitable_targets(&rows, Approach::FromLeft)), vec![7, 3]);
    }

    #[test]
    fn approach_against_matches_deployment_edges() {
        assert_eq!(Approach::against(Side::Computer), Approach::FromLeft);
        assert_eq!(Approach::against(Side::Player), Approach::FromRight);
    }

    #[test]
    fn grouping_places_units_by_row_and_column() {
        let grid = GridDimensions::new(3, 2).expect("valid grid");
        let a = unit(1, (2, 0), 10);
        let b = unit(2, (0, 1), 10);
        let stray = unit(3, (5, 5), 10);

        let rows = rows_by_row([&a, &b, &stray], grid);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == 3));
        assert_eq!(rows[0][2].map(Unit::id), Some(a.id()));
        assert_eq!(rows[1][0].map(Unit::id), Some(b.id()));
        assert_eq!(rows.iter().flatten().flatten().count(), 2);
    }

    #[test]
    fn grouping_prefers_live_units_on_shared_cells() {
        let grid = GridDimensions::new(2, 1).expect("valid grid");
        let fallen = unit(1, (1, 0), 0);
        let standing = unit(2, (1, 0), 10);

        let rows = rows_by_row([&standing, &fallen], grid);
        assert_eq!(rows[0][1].map(Unit::id), Some(standing.id()));

        let rows = rows_by_row([&fallen, &standing], grid);
        assert_eq!(rows[0][1].map(Unit::id), Some(standing.id()));
    }
}
