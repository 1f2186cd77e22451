//! Units, rosters and the battlefield holding both sides
//!
//! A unit is alive while its health is above zero. Rosters never gain units
//! mid-battle; the battle loop only removes dead ones.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::battle::grid::{Cell, Grid, OccupancySet};
use crate::battle::policy::AttackPolicy;
use crate::core::error::{BattleError, Result};
use crate::core::types::UnitId;

/// How a unit delivers its attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackType {
    #[default]
    Melee,
    Ranged,
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackType::Melee => write!(f, "melee"),
            AttackType::Ranged => write!(f, "ranged"),
        }
    }
}

/// Which side of the grid an army starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Unit stats as loaded from scenario files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub name: String,
    pub unit_type: String,
    pub health: i32,
    pub base_attack: i32,
    pub cost: u32,
    #[serde(default)]
    pub attack_type: AttackType,
    /// Damage multipliers keyed by the target's unit type
    #[serde(default)]
    pub attack_bonuses: HashMap<String, f64>,
    /// Damage divisors keyed by the attacker's unit type
    #[serde(default)]
    pub defence_bonuses: HashMap<String, f64>,
    #[serde(default)]
    pub position: Option<Cell>,
}

impl UnitTemplate {
    pub fn new(
        name: impl Into<String>,
        unit_type: impl Into<String>,
        health: i32,
        base_attack: i32,
        cost: u32,
        attack_type: AttackType,
    ) -> Self {
        Self {
            name: name.into(),
            unit_type: unit_type.into(),
            health,
            base_attack,
            cost,
            attack_type,
            attack_bonuses: HashMap::new(),
            defence_bonuses: HashMap::new(),
            position: None,
        }
    }

    pub fn at(mut self, position: Cell) -> Self {
        self.position = Some(position);
        self
    }

    /// Stat value per point of cost
    pub fn efficiency(&self) -> f64 {
        if self.cost == 0 {
            return 0.0;
        }
        (self.base_attack as f64 + self.health as f64) / self.cost as f64
    }
}

/// A combatant on the battlefield
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub unit_type: String,
    pub health: i32,
    pub base_attack: i32,
    pub cost: u32,
    pub attack_type: AttackType,
    pub attack_bonuses: HashMap<String, f64>,
    pub defence_bonuses: HashMap<String, f64>,
    pub position: Cell,
    policy: Arc<dyn AttackPolicy>,
}

impl Unit {
    /// Plain melee unit with no bonuses; its unit type is its name
    pub fn new(name: impl Into<String>, health: i32, base_attack: i32, position: Cell) -> Self {
        let name = name.into();
        let template =
            UnitTemplate::new(name.clone(), name, health, base_attack, 1, AttackType::Melee)
                .at(position);
        Self::from_template(&template)
    }

    /// Fresh unit from a template, with the default policy for its attack type.
    /// Unplaced templates start at the origin until deployed.
    pub fn from_template(template: &UnitTemplate) -> Self {
        Self {
            id: UnitId::new(),
            name: template.name.clone(),
            unit_type: template.unit_type.clone(),
            health: template.health,
            base_attack: template.base_attack,
            cost: template.cost,
            attack_type: template.attack_type,
            attack_bonuses: template.attack_bonuses.clone(),
            defence_bonuses: template.defence_bonuses.clone(),
            position: template.position.unwrap_or_default(),
            policy: template.attack_type.default_policy(),
        }
    }

    /// Replace the attack policy
    pub fn with_policy(mut self, policy: Arc<dyn AttackPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> Arc<dyn AttackPolicy> {
        Arc::clone(&self.policy)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn attack_bonus_against(&self, unit_type: &str) -> f64 {
        self.attack_bonuses.get(unit_type).copied().unwrap_or(1.0)
    }

    pub fn defence_bonus_against(&self, unit_type: &str) -> f64 {
        self.defence_bonuses.get(unit_type).copied().unwrap_or(1.0)
    }

    /// Reduce health, never below zero. Returns the damage actually taken.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        let taken = damage.clamp(0, self.health.max(0));
        self.health -= taken;
        taken
    }
}

/// One side's units plus their point total
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub units: Vec<Unit>,
    pub points: u32,
}

impl Roster {
    /// Roster whose points are the sum of its units' costs, saturating at `u32::MAX`
    pub fn new(units: Vec<Unit>) -> Self {
        let points = units.iter().fold(0u32, |acc, u| acc.saturating_add(u.cost));
        Self { units, points }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn has_alive_units(&self) -> bool {
        self.units.iter().any(Unit::is_alive)
    }

    pub fn alive_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_alive()).count()
    }

    pub fn alive_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_alive())
    }

    /// Summed in `i64` so armies of huge units cannot overflow
    pub fn total_health(&self) -> i64 {
        self.alive_units().map(|u| i64::from(u.health)).sum()
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.get(id).is_some()
    }

    /// Stable sort by base attack, strongest first
    pub fn sort_by_attack(&mut self) {
        self.units.sort_by(|a, b| b.base_attack.cmp(&a.base_attack));
    }

    /// Drop every dead unit, keeping order
    pub fn remove_dead(&mut self) -> usize {
        let before = self.units.len();
        self.units.retain(Unit::is_alive);
        before - self.units.len()
    }
}

/// Both rosters on one grid
#[derive(Debug, Clone)]
pub struct Battlefield {
    pub grid: Grid,
    pub left: Roster,
    pub right: Roster,
}

impl Battlefield {
    pub fn new(grid: Grid, left: Roster, right: Roster) -> Self {
        Self { grid, left, right }
    }

    pub fn roster(&self, side: Side) -> &Roster {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn roster_mut(&mut self, side: Side) -> &mut Roster {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn side_of(&self, id: UnitId) -> Option<Side> {
        if self.left.contains(id) {
            Some(Side::Left)
        } else if self.right.contains(id) {
            Some(Side::Right)
        } else {
            None
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.left.get(id).or_else(|| self.right.get(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        if self.left.contains(id) {
            self.left.get_mut(id)
        } else {
            self.right.get_mut(id)
        }
    }

    pub fn is_alive(&self, id: UnitId) -> bool {
        self.unit(id).is_some_and(Unit::is_alive)
    }

    /// Every unit on the field, both sides, dead or alive
    pub fn all_units(&self) -> impl Iterator<Item = &Unit> {
        self.left.units.iter().chain(self.right.units.iter())
    }

    /// Fresh occupancy snapshot of both rosters
    pub fn occupancy(&self) -> OccupancySet {
        OccupancySet::from_units(self.all_units())
    }

    /// Units of `side` laid out by grid row: `rows[y][x]`.
    ///
    /// A living unit wins a cell over a dead one left on the same spot.
    /// Units outside the grid are left out.
    pub fn rows(&self, side: Side) -> Vec<Vec<Option<&Unit>>> {
        let width = self.grid.width() as usize;
        let mut rows: Vec<Vec<Option<&Unit>>> =
            (0..self.grid.height()).map(|_| vec![None; width]).collect();

        for unit in &self.roster(side).units {
            if !self.grid.contains(unit.position) {
                continue;
            }
            let slot = &mut rows[unit.position.y as usize][unit.position.x as usize];
            if !slot.is_some_and(Unit::is_alive) {
                *slot = Some(unit);
            }
        }
        rows
    }

    /// Check the roster input contract: positive cost and health, unique
    /// ids, in-bounds positions, no two living units on one cell.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut cells = HashSet::new();

        for unit in self.all_units() {
            if unit.cost == 0 {
                return Err(BattleError::InvalidRoster(format!(
                    "unit {} ({}) has zero cost",
                    unit.id, unit.name
                )));
            }
            if unit.health <= 0 {
                return Err(BattleError::InvalidRoster(format!(
                    "unit {} ({}) starts with non-positive health {}",
                    unit.id, unit.name, unit.health
                )));
            }
            if !self.grid.contains(unit.position) {
                return Err(BattleError::InvalidRoster(format!(
                    "unit {} ({}) at ({}, {}) is outside the {}x{} grid",
                    unit.id,
                    unit.name,
                    unit.position.x,
                    unit.position.y,
                    self.grid.width(),
                    self.grid.height()
                )));
            }
            if !ids.insert(unit.id) {
                return Err(BattleError::InvalidRoster(format!(
                    "duplicate unit id {}",
                    unit.id
                )));
            }
            if !cells.insert(unit.position) {
                return Err(BattleError::InvalidRoster(format!(
                    "two units share cell ({}, {})",
                    unit.position.x, unit.position.y
                )));
            }
        }
        Ok(())
    }
}
