//! Attack policies: how a unit picks a target and strikes it
//!
//! The battle loop treats a policy as opaque. It hands over the attacker's id
//! and the battlefield and gets back the unit that was struck, if any.

use std::fmt;
use std::sync::Arc;

use crate::battle::pathfinding::{find_path, path_steps};
use crate::battle::targeting::exposed_targets;
use crate::battle::units::{AttackType, Battlefield, Unit};
use crate::core::types::UnitId;

/// Capability every unit carries: select a target and strike it
pub trait AttackPolicy: fmt::Debug + Send + Sync {
    /// Returns the unit struck, or `None` when no action was taken
    fn attack(&self, attacker: UnitId, field: &mut Battlefield) -> Option<UnitId>;
}

impl AttackType {
    pub fn default_policy(self) -> Arc<dyn AttackPolicy> {
        match self {
            AttackType::Melee => Arc::new(MeleePolicy),
            AttackType::Ranged => Arc::new(RangedPolicy),
        }
    }
}

/// Strikes the enemy front line, preferring the closest reachable unit
#[derive(Debug, Clone, Copy, Default)]
pub struct MeleePolicy;

impl AttackPolicy for MeleePolicy {
    fn attack(&self, attacker: UnitId, field: &mut Battlefield) -> Option<UnitId> {
        let target = choose_melee_target(field, attacker)?;
        resolve_strike(field, attacker, target)?;
        Some(target)
    }
}

/// Strikes the weakest living enemy anywhere on the field
#[derive(Debug, Clone, Copy, Default)]
pub struct RangedPolicy;

impl AttackPolicy for RangedPolicy {
    fn attack(&self, attacker: UnitId, field: &mut Battlefield) -> Option<UnitId> {
        let target = choose_ranged_target(field, attacker)?;
        resolve_strike(field, attacker, target)?;
        Some(target)
    }
}

/// Exposed enemy with the shortest route from the attacker.
///
/// Unreachable candidates are skipped; ties go to the earlier row.
pub fn choose_melee_target(field: &Battlefield, attacker: UnitId) -> Option<UnitId> {
    let side = field.side_of(attacker)?;
    let unit = field.unit(attacker).filter(|u| u.is_alive())?;

    exposed_targets(field, side.opposite())
        .into_iter()
        .filter_map(|target| {
            let path = find_path(&field.grid, unit, target, field.all_units());
            path_steps(&path).map(|steps| (steps, target.id))
        })
        .min_by_key(|(steps, _)| *steps)
        .map(|(_, id)| id)
}

/// Living enemy with the least health; ties go to roster order
pub fn choose_ranged_target(field: &Battlefield, attacker: UnitId) -> Option<UnitId> {
    let side = field.side_of(attacker)?;
    if !field.is_alive(attacker) {
        return None;
    }

    field
        .roster(side.opposite())
        .alive_units()
        .min_by_key(|u| u.health)
        .map(|u| u.id)
}

/// Damage `attacker` deals to `target`.
///
/// Base attack scaled by the attacker's bonus against the target's type and
/// divided by the target's defence against the attacker's type.
pub fn strike_damage(attacker: &Unit, target: &Unit) -> i32 {
    let attack = attacker.attack_bonus_against(&target.unit_type);
    let mut defence = target.defence_bonus_against(&attacker.unit_type);
    if defence <= 0.0 {
        defence = 1.0;
    }
    let damage = (attacker.base_attack as f64 * attack / defence).round();
    damage.max(0.0) as i32
}

/// Apply one strike. Returns the damage dealt, or `None` if either unit is
/// missing or dead.
pub fn resolve_strike(field: &mut Battlefield, attacker: UnitId, target: UnitId) -> Option<i32> {
    let attacker_unit = field.unit(attacker).filter(|u| u.is_alive())?;
    let target_unit = field.unit(target).filter(|u| u.is_alive())?;
    let damage = strike_damage(attacker_unit, target_unit);

    let target_unit = field.unit_mut(target)?;
    let dealt = target_unit.take_damage(damage);
    tracing::debug!(
        "{} takes {} damage, {} health left",
        target_unit.name,
        dealt,
        target_unit.health
    );
    Some(dealt)
}
