//! Army presets: greedy unit selection within a point budget, then deployment
//!
//! Templates are ranked by stats per point of cost. Each template is copied
//! until its type hits the per-type cap or the budget runs out.

use std::collections::HashMap;

use crate::battle::constants::{DEPLOYMENT_COLUMNS, MAX_UNITS_PER_TYPE};
use crate::battle::grid::{Cell, Grid};
use crate::battle::units::{Roster, Side, Unit, UnitTemplate};
use crate::core::error::{BattleError, Result};

/// Build and deploy an army for `side` costing at most `max_points`
pub fn generate_preset(
    templates: &[UnitTemplate],
    max_points: u32,
    side: Side,
    grid: &Grid,
) -> Result<Roster> {
    let mut ranked: Vec<&UnitTemplate> = templates.iter().filter(|t| t.cost > 0).collect();
    // Stable: equally efficient templates keep their listed order
    ranked.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency()));

    let mut units = Vec::new();
    let mut points = 0u32;
    let mut counts: HashMap<&str, u32> = HashMap::new();

    for template in ranked {
        let cap = MAX_UNITS_PER_TYPE.min(max_points / template.cost);
        let count = counts.entry(template.unit_type.as_str()).or_insert(0);

        while *count < cap {
            match points.checked_add(template.cost) {
                Some(next) if next <= max_points => points = next,
                _ => break,
            }
            units.push(Unit::from_template(template));
            *count += 1;
        }
    }

    let mut roster = Roster { units, points };
    deploy(&mut roster, side, grid)?;

    tracing::debug!(
        "Generated {:?} army: {} units, {}/{} points",
        side,
        roster.len(),
        roster.points,
        max_points
    );
    Ok(roster)
}

/// Place units in the deployment columns at `side`'s edge of the grid.
///
/// The column nearest the enemy fills first, top to bottom, in roster order.
pub fn deploy(roster: &mut Roster, side: Side, grid: &Grid) -> Result<()> {
    let columns = DEPLOYMENT_COLUMNS.min(grid.width());
    let height = grid.height();
    let capacity = (columns * height) as usize;

    if roster.len() > capacity {
        return Err(BattleError::InvalidRoster(format!(
            "{} units do not fit in {} deployment cells",
            roster.len(),
            capacity
        )));
    }

    for (i, unit) in roster.units.iter_mut().enumerate() {
        let i = i as i32;
        let depth = i / height;
        let y = i % height;
        let x = match side {
            Side::Left => columns - 1 - depth,
            Side::Right => grid.width() - columns + depth,
        };
        unit.position = Cell::new(x, y);
    }
    Ok(())
}
