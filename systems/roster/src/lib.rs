#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy roster generation under a point budget.
//!
//! Archetypes are ranked by how much attack and health each point buys, then
//! recruited best-first until either the per-type cap or the budget stops them.
//! Every recruit is dropped onto a random free cell of the placement strip.

use std::collections::HashSet;

use grid_battle_core::{
    Archetype, CellCoord, ConfigError, GridDimensions, Roster, Side, Unit, UnitId,
    PLACEMENT_DIMENSIONS, UNITS_PER_TYPE_CAP,
};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

const DEFAULT_PLACEMENT_RETRIES: u32 = 256;

/// Configuration parameters required to construct the roster generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    placement: GridDimensions,
    per_type_cap: u32,
    placement_retries: u32,
}

impl Config {
    /// Creates a configuration with an explicit placement grid, per-type cap
    /// and number of random re-rolls tried before scanning for a free cell.
    #[must_use]
    pub const fn new(placement: GridDimensions, per_type_cap: u32, placement_retries: u32) -> Self {
        Self {
            placement,
            per_type_cap,
            placement_retries,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            PLACEMENT_DIMENSIONS,
            UNITS_PER_TYPE_CAP,
            DEFAULT_PLACEMENT_RETRIES,
        )
    }
}

/// Pure system that assembles rosters from an archetype catalog.
#[derive(Debug, Default)]
pub struct RosterGenerator {
    config: Config,
}

impl RosterGenerator {
    /// Creates a roster generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Recruits a roster for `side` that never spends more than `max_points`.
    ///
    /// Units receive identifiers in recruitment order and are named after
    /// their archetype with a per-archetype counter, e.g. `"Archer 3"`. The
    /// roster may under-spend when no remaining archetype fits the budget.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidArchetype`] for zero-cost archetypes and
    /// [`ConfigError::PlacementSaturated`] when the placement grid runs out of
    /// free cells.
    pub fn generate<R>(
        &self,
        archetypes: &[Archetype],
        max_points: u32,
        side: Side,
        rng: &mut R,
    ) -> Result<Roster, ConfigError>
    where
        R: Rng + ?Sized,
    {
        for archetype in archetypes {
            if archetype.cost == 0 {
                return Err(ConfigError::InvalidArchetype {
                    name: archetype.name.clone(),
                    reason: "cost must be positive",
                });
            }
        }

        let mut placement = Placement::new(self.config.placement, self.config.placement_retries);
        let mut roster = Roster::default();
        let mut ordinal = 0;

        for archetype in rank(archetypes) {
            let mut recruited = 0;
            while recruited < self.config.per_type_cap && fits(&roster, archetype, max_points) {
                let cell = placement.claim(rng)?;
                recruited += 1;
                roster.push(Unit::from_archetype(
                    UnitId::new(side, ordinal),
                    format!("{} {recruited}", archetype.name),
                    archetype,
                    cell,
                ));
                ordinal += 1;
            }

            if recruited > 0 {
                debug!(archetype = %archetype.name, recruited, "archetype recruited");
            }
        }

        debug!(
            ?side,
            units = roster.units().len(),
            points = roster.points(),
            max_points,
            "roster generated"
        );
        Ok(roster)
    }
}

/// Orders archetypes by value per point, best first; ties keep catalog order.
fn rank(archetypes: &[Archetype]) -> Vec<&Archetype> {
    let mut ranked: Vec<&Archetype> = archetypes.iter().collect();
    ranked.sort_by(|left, right| right.value_per_point().total_cmp(&left.value_per_point()));
    ranked
}

fn fits(roster: &Roster, archetype: &Archetype, max_points: u32) -> bool {
    u64::from(roster.points()) + u64::from(archetype.cost) <= u64::from(max_points)
}

/// Tracks claimed cells of the placement grid.
#[derive(Debug)]
struct Placement {
    dimensions: GridDimensions,
    occupied: HashSet<CellCoord>,
    retries: u32,
}

impl Placement {
    fn new(dimensions: GridDimensions, retries: u32) -> Self {
        Self {
            dimensions,
            occupied: HashSet::with_capacity(dimensions.cell_count()),
            retries,
        }
    }

    fn claim<R>(&mut self, rng: &mut R) -> Result<CellCoord, ConfigError>
    where
        R: Rng + ?Sized,
    {
        let capacity = self.dimensions.cell_count();
        if self.occupied.len() >= capacity {
            return Err(ConfigError::PlacementSaturated { capacity });
        }

        for _ in 0..self.retries {
            let cell = CellCoord::new(
                rng.gen_range(0..self.dimensions.columns()),
                rng.gen_range(0..self.dimensions.rows()),
            );
            if self.occupied.insert(cell) {
                return Ok(cell);
            }
        }

        let free: Vec<CellCoord> = self
            .dimensions
            .cells()
            .filter(|cell| !self.occupied.contains(cell))
            .collect();
        let cell = *free
            .choose(rng)
            .ok_or(ConfigError::PlacementSaturated { capacity })?;
        debug!(remaining = free.len(), "placement re-rolls exhausted, picked a free cell");
        let _ = self.occupied.insert(cell);
        Ok(cell)
    }
}
