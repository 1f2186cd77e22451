//! Battle configuration and scenario loading
//!
//! A scenario is a TOML file holding the battle configuration plus one army
//! description per side. Armies are either a point budget over unit templates
//! (run through the preset generator) or an explicit list of placed units.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{DEFAULT_PACING_MS, GRID_HEIGHT, GRID_WIDTH, MAX_GRID_CELLS};
use crate::battle::grid::Grid;
use crate::battle::preset::{deploy, generate_preset};
use crate::battle::units::{Battlefield, Roster, Side, Unit, UnitTemplate};
use crate::core::error::{BattleError, Result};
use crate::core::types::Round;

/// Grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }
}

impl GridConfig {
    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height)
    }
}

/// Configuration for a single battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub grid: GridConfig,

    /// Delay after each logged attack, for human-readable playback.
    /// Zero disables pacing.
    pub pacing_ms: u64,

    /// Optional cap on rounds. When reached with both rosters still alive
    /// the battle ends as a stalemate.
    pub max_rounds: Option<Round>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            pacing_ms: DEFAULT_PACING_MS,
            max_rounds: None,
        }
    }
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.grid.width <= 0 || self.grid.height <= 0 {
            return Err(BattleError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        let cells = i64::from(self.grid.width) * i64::from(self.grid.height);
        if cells > MAX_GRID_CELLS {
            return Err(BattleError::InvalidConfig(format!(
                "grid {}x{} exceeds {} cells",
                self.grid.width, self.grid.height, MAX_GRID_CELLS
            )));
        }
        if self.max_rounds == Some(0) {
            return Err(BattleError::InvalidConfig(
                "max_rounds must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}

/// One side's army description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmySpec {
    /// When set, `units` are templates and the army is generated greedily
    /// within this budget. When absent, `units` are fielded as listed.
    pub max_points: Option<u32>,
    pub units: Vec<UnitTemplate>,
}

impl ArmySpec {
    /// Build the roster for `side`. An explicit list must be either fully
    /// placed or fully unplaced; unplaced armies are deployed.
    pub fn build(&self, side: Side, grid: &Grid) -> Result<Roster> {
        if let Some(max_points) = self.max_points {
            return generate_preset(&self.units, max_points, side, grid);
        }

        let unplaced = self.units.iter().filter(|t| t.position.is_none()).count();
        if unplaced > 0 && unplaced < self.units.len() {
            return Err(BattleError::InvalidRoster(format!(
                "{side:?} army mixes placed and unplaced units ({unplaced} of {} unplaced)",
                self.units.len()
            )));
        }

        let units: Vec<Unit> = self.units.iter().map(Unit::from_template).collect();
        let mut roster = Roster::new(units);
        if unplaced > 0 {
            deploy(&mut roster, side, grid)?;
        }
        Ok(roster)
    }
}

/// Complete battle scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: BattleConfig,
    pub left: ArmySpec,
    pub right: ArmySpec,
}

impl Scenario {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// Build both rosters and check them against the input contract
    pub fn build_battlefield(&self) -> Result<Battlefield> {
        let grid = self.config.grid.grid();
        let left = self.left.build(Side::Left, &grid)?;
        let right = self.right.build(Side::Right, &grid)?;
        let field = Battlefield::new(grid, left, right);
        field.validate()?;
        Ok(field)
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)?;
    let scenario = Scenario::from_toml_str(&contents)?;
    tracing::debug!("Loaded scenario from {}", path.display());
    Ok(scenario)
}
