#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the grid battle engine.
//!
//! This crate defines the vocabulary that connects the pure systems with the
//! host adapter. Rosters are produced by the roster system, laid out on a
//! bounded grid of [`CellCoord`] values, and consumed by the battle loop,
//! which consults the targeting and pathfinding systems for every turn and
//! reports what happened as a stream of [`BattleEvent`] values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimensions of the battlefield both armies fight on.
pub const BATTLEFIELD_DIMENSIONS: GridDimensions = GridDimensions {
    columns: 27,
    rows: 21,
};

/// Dimensions of the deployment strip a generated roster is placed on.
pub const PLACEMENT_DIMENSIONS: GridDimensions = GridDimensions {
    columns: 3,
    rows: 21,
};

/// Maximum number of units of a single archetype in a generated roster.
pub const UNITS_PER_TYPE_CAP: u32 = 11;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell (the x axis).
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell (the y axis).
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Width and height of a bounded grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    columns: u32,
    rows: u32,
}

impl GridDimensions {
    /// Creates a grid description, rejecting grids without any cells.
    pub fn new(columns: u32, rows: u32) -> Result<Self, ConfigError> {
        if columns == 0 || rows == 0 {
            return Err(ConfigError::InvalidGridDimensions { columns, rows });
        }

        let cell_count = u64::from(columns) * u64::from(rows);
        if usize::try_from(cell_count).is_err() {
            return Err(ConfigError::InvalidGridDimensions { columns, rows });
        }

        Ok(Self { columns, rows })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells covered by the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Dense row-major index of the cell, or `None` when it lies outside.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Iterates over every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }
}

/// Army a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Army deployed along the left edge of the battlefield.
    Player,
    /// Army deployed along the right edge of the battlefield.
    Computer,
}

impl Side {
    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Computer,
            Self::Computer => Self::Player,
        }
    }
}

/// Identifier of a unit, unique across both armies of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    side: Side,
    ordinal: u32,
}

impl UnitId {
    /// Creates an identifier for the `ordinal`-th unit of `side`.
    #[must_use]
    pub const fn new(side: Side, ordinal: u32) -> Self {
        Self { side, ordinal }
    }

    /// Side the unit belongs to.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Position of the unit within its roster.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }
}

/// How a unit delivers its attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackType {
    /// Must walk up to its target before striking.
    Melee,
    /// Strikes from its current cell.
    Ranged,
}

/// Damage multipliers keyed by the archetype name of the opposing unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BonusTable {
    multipliers: BTreeMap<String, f64>,
}

impl BonusTable {
    /// Creates a table from `(archetype, multiplier)` pairs.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            multipliers: pairs
                .into_iter()
                .map(|(name, multiplier)| (name.into(), multiplier))
                .collect(),
        }
    }

    /// Multiplier applied against `archetype`; absent entries are neutral.
    #[must_use]
    pub fn multiplier(&self, archetype: &str) -> f64 {
        self.multipliers.get(archetype).copied().unwrap_or(1.0)
    }

    /// Iterates over the explicit entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.multipliers
            .iter()
            .map(|(name, multiplier)| (name.as_str(), *multiplier))
    }
}

/// Catalog template from which units are instantiated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Unique archetype name, also the key used by bonus tables.
    pub name: String,
    /// Starting health of a fresh unit.
    pub health: u32,
    /// Damage dealt before bonuses are applied.
    pub base_attack: u32,
    /// Points spent to recruit one unit.
    pub cost: u32,
    /// Delivery mode of the unit's attack.
    pub attack_type: AttackType,
    /// Multipliers applied to damage dealt against other archetypes.
    #[serde(default)]
    pub attack_bonuses: BonusTable,
    /// Divisors applied to damage received from other archetypes.
    #[serde(default)]
    pub defence_bonuses: BonusTable,
}

impl Archetype {
    /// Combat value bought per point: `(base_attack + health) / cost`.
    ///
    /// Zero-cost archetypes rank as infinitely valuable; catalogs reject them
    /// before ranking.
    #[must_use]
    pub fn value_per_point(&self) -> f64 {
        let value = f64::from(self.base_attack) + f64::from(self.health);
        value / f64::from(self.cost)
    }
}

/// A single combatant placed on the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    name: String,
    archetype: String,
    health: u32,
    base_attack: u32,
    cost: u32,
    attack_type: AttackType,
    attack_bonuses: BonusTable,
    defence_bonuses: BonusTable,
    cell: CellCoord,
}

impl Unit {
    /// Instantiates a fresh unit of `archetype` at `cell`.
    #[must_use]
    pub fn from_archetype(
        id: UnitId,
        name: impl Into<String>,
        archetype: &Archetype,
        cell: CellCoord,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            archetype: archetype.name.clone(),
            health: archetype.health,
            base_attack: archetype.base_attack,
            cost: archetype.cost,
            attack_type: archetype.attack_type,
            attack_bonuses: archetype.attack_bonuses.clone(),
            defence_bonuses: archetype.defence_bonuses.clone(),
            cell,
        }
    }

    /// Identifier of the unit.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Side the unit fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.id.side()
    }

    /// Display name of the unit instance.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the archetype the unit was created from.
    #[must_use]
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Damage dealt before bonuses are applied.
    #[must_use]
    pub const fn base_attack(&self) -> u32 {
        self.base_attack
    }

    /// Points the unit cost to recruit.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Delivery mode of the unit's attack.
    #[must_use]
    pub const fn attack_type(&self) -> AttackType {
        self.attack_type
    }

    /// Multipliers applied to damage dealt by this unit.
    #[must_use]
    pub const fn attack_bonuses(&self) -> &BonusTable {
        &self.attack_bonuses
    }

    /// Divisors applied to damage received by this unit.
    #[must_use]
    pub const fn defence_bonuses(&self) -> &BonusTable {
        &self.defence_bonuses
    }

    /// Cell the unit currently occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// A unit is alive while it has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Removes `amount` health, saturating at zero, and returns what remains.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    /// Relocates the unit to `cell`.
    pub fn move_to(&mut self, cell: CellCoord) {
        self.cell = cell;
    }
}

/// One side's army together with the points spent on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    units: Vec<Unit>,
    points: u32,
}

impl Roster {
    /// Creates a roster from units and the points spent on them.
    #[must_use]
    pub fn new(units: Vec<Unit>, points: u32) -> Self {
        Self { units, points }
    }

    /// Units in recruitment order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Mutable access to the units.
    pub fn units_mut(&mut self) -> &mut Vec<Unit> {
        &mut self.units
    }

    /// Total points spent on the roster.
    #[must_use]
    pub const fn points(&self) -> u32 {
        self.points
    }

    /// Overrides the recorded point total.
    pub fn set_points(&mut self, points: u32) {
        self.points = points;
    }

    /// Appends a unit and accounts for its cost.
    pub fn push(&mut self, unit: Unit) {
        self.points = self.points.saturating_add(unit.cost());
        self.units.push(unit);
    }

    /// Reflects every unit horizontally onto a grid `columns` wide.
    ///
    /// Rosters are generated on the left-anchored placement strip; the army
    /// fighting from the right edge is mirrored before deployment.
    pub fn mirror_columns(&mut self, columns: u32) {
        let last = columns.saturating_sub(1);
        for unit in &mut self.units {
            let cell = unit.cell();
            unit.move_to(CellCoord::new(last.saturating_sub(cell.column()), cell.row()));
        }
    }

    /// Consumes the roster, yielding its units.
    #[must_use]
    pub fn into_units(self) -> Vec<Unit> {
        self.units
    }
}

/// Observable battle happenings, in the order they occurred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// A new round began.
    RoundStarted {
        /// One-based round number.
        round: u32,
    },
    /// A melee unit walked towards its target.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit left.
        from: CellCoord,
        /// Cell the unit arrived at.
        to: CellCoord,
    },
    /// A unit struck an opponent.
    UnitAttacked {
        /// Unit that attacked.
        attacker: UnitId,
        /// Unit that was hit.
        target: UnitId,
        /// Health removed by the strike.
        damage: u32,
        /// Health the target has left.
        remaining_health: u32,
    },
    /// A unit's health reached zero.
    UnitDefeated {
        /// Unit that fell.
        unit: UnitId,
    },
    /// A unit found nothing it could attack this turn.
    TurnHeld {
        /// Unit that held its position.
        unit: UnitId,
    },
}

/// How a simulated battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// Only the player army has units left.
    PlayerVictory,
    /// Only the computer army has units left.
    ComputerVictory,
    /// Neither army has units left.
    Draw,
    /// The host asked the battle to stop at a round boundary.
    Interrupted {
        /// Rounds completed before stopping.
        rounds: u32,
    },
    /// The safety bound on rounds was reached with both armies standing.
    RoundLimitReached {
        /// Rounds completed before stopping.
        rounds: u32,
    },
}

/// Invalid configuration that prevents a system from producing a result.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid has no cells or is too large to address.
    #[error("invalid grid dimensions {columns}x{rows}")]
    InvalidGridDimensions {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// Every placement cell is taken, so another unit cannot be placed.
    #[error("placement grid saturated: all {capacity} cells are occupied")]
    PlacementSaturated {
        /// Number of cells in the placement grid.
        capacity: usize,
    },
    /// An archetype cannot be recruited as described.
    #[error("invalid archetype `{name}`: {reason}")]
    InvalidArchetype {
        /// Name of the offending archetype.
        name: String,
        /// Why the archetype was rejected.
        reason: &'static str,
    },
    /// A unit was deployed outside the battlefield.
    #[error("unit {unit:?} placed outside the grid at {cell:?}")]
    UnitOutOfBounds {
        /// Offending unit.
        unit: UnitId,
        /// Cell it was placed on.
        cell: CellCoord,
    },
    /// Two units share an identifier.
    #[error("unit identifier {unit:?} used more than once")]
    DuplicateUnit {
        /// Identifier that was repeated.
        unit: UnitId,
    },
    /// Two live units were deployed onto the same cell.
    #[error("unit {unit:?} deployed onto {cell:?}, already held by {occupant:?}")]
    CellOccupied {
        /// Unit that arrived second.
        unit: UnitId,
        /// Cell both units claim.
        cell: CellCoord,
        /// Unit already standing there.
        occupant: UnitId,
    },
    /// A unit was handed to the army it does not belong to.
    #[error("unit {unit:?} deployed with the {expected:?} army")]
    SideMismatch {
        /// Offending unit.
        unit: UnitId,
        /// Side of the roster the unit arrived in.
        expected: Side,
    },
}
