//! Loads and validates the archetype catalog consumed by roster generation.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use grid_battle_core::{Archetype, BonusTable};
use serde::Deserialize;

/// Catalog shipped with the binary, used when no file is supplied.
const BUILT_IN_CATALOG: &str = include_str!("../catalog.toml");

/// Archetypes available to both armies.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct Catalog {
    #[serde(rename = "archetype", default)]
    archetypes: Vec<Archetype>,
}

impl Catalog {
    /// Reads the catalog at `path`, or the built-in one when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::parse(BUILT_IN_CATALOG).context("built-in catalog is invalid");
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read archetype catalog at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid archetype catalog at {}", path.display()))
    }

    /// Archetypes in catalog order.
    pub(crate) fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    fn parse(contents: &str) -> Result<Self> {
        let catalog: Self =
            toml::from_str(contents).context("failed to parse archetype catalog toml contents")?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if self.archetypes.is_empty() {
            bail!("catalog defines no archetypes");
        }

        let mut names = HashSet::with_capacity(self.archetypes.len());
        for archetype in &self.archetypes {
            if !names.insert(archetype.name.as_str()) {
                bail!("catalog contains duplicate archetype `{}`", archetype.name);
            }
            if archetype.cost == 0 {
                bail!("archetype `{}` must cost at least one point", archetype.name);
            }
        }

        for archetype in &self.archetypes {
            check_bonuses(&archetype.attack_bonuses, &names)
                .with_context(|| format!("archetype `{}` attack bonuses", archetype.name))?;
            check_bonuses(&archetype.defence_bonuses, &names)
                .with_context(|| format!("archetype `{}` defence bonuses", archetype.name))?;
        }

        Ok(())
    }
}

fn check_bonuses(bonuses: &BonusTable, names: &HashSet<&str>) -> Result<()> {
    for (name, multiplier) in bonuses.iter() {
        if !names.contains(name) {
            bail!("unknown archetype `{name}`");
        }
        if !multiplier.is_finite() || multiplier <= 0.0 {
            bail!("multiplier against `{name}` must be a positive number, got {multiplier}");
        }
    }
    Ok(())
}
